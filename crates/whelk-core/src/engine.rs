use crate::activate::{self, ActivationMode};
use crate::plan::{build_plan, ActivationPlan};
use crate::CoreError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use whelk_resolver::{fetch_verified, Resolver};
use whelk_schema::{
    compute_descriptor_id, parse_descriptor_file, DescriptorV1, EnvSection, LockError, LockFile,
    NormalizedDescriptor, PlanIdentity, ShellSection,
};

pub const LOCK_FILE_NAME: &str = "whelk.lock";

/// Central orchestration engine for whelk activation.
///
/// Coordinates descriptor parsing, overlay application, package resolution,
/// lock file verification, and activation. The resolver is the seam to the
/// external package manager.
pub struct Engine {
    resolver: Box<dyn Resolver>,
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Require an existing lock file and fail if the resolved plan drifts.
    pub locked: bool,
    /// Fetch and checksum-verify every pinned source in the plan.
    pub verify_sources: bool,
    /// Ad-hoc packages appended after the descriptor's declared list.
    pub extra_packages: Vec<String>,
}

/// Result of successful planning.
#[derive(Debug)]
pub struct PlanResult {
    pub plan: ActivationPlan,
    pub lock_file: LockFile,
}

impl Engine {
    pub fn new(resolver: Box<dyn Resolver>) -> Self {
        Self { resolver }
    }

    /// Parse and validate a descriptor without resolving anything.
    ///
    /// Returns the normalized descriptor and its preliminary identity (the
    /// canonical identity requires resolution; see `LockFile`).
    pub fn check(&self, path: &Path) -> Result<(NormalizedDescriptor, PlanIdentity), CoreError> {
        let descriptor = parse_descriptor_file(path)?;
        let normalized = descriptor.normalize()?;
        let identity = compute_descriptor_id(&normalized);
        Ok((normalized, identity))
    }

    /// Plan from a descriptor file, with optional ad-hoc extra packages.
    pub fn plan_from_file(
        &self,
        path: &Path,
        inherited: &BTreeMap<String, String>,
        options: &PlanOptions,
    ) -> Result<PlanResult, CoreError> {
        info!("planning from {}", path.display());
        let mut descriptor = parse_descriptor_file(path)?;
        descriptor
            .shell
            .packages
            .extend(options.extra_packages.iter().cloned());
        let lock_path = path
            .parent()
            .unwrap_or(Path::new("."))
            .join(LOCK_FILE_NAME);
        self.plan_descriptor(&descriptor, Some(&lock_path), inherited, options)
    }

    /// Plan an ad-hoc environment from bare package names, no descriptor
    /// file involved.
    pub fn plan_adhoc(
        &self,
        packages: &[String],
        inherited: &BTreeMap<String, String>,
        options: &PlanOptions,
    ) -> Result<PlanResult, CoreError> {
        let mut all = packages.to_vec();
        all.extend(options.extra_packages.iter().cloned());
        let descriptor = DescriptorV1 {
            descriptor_version: 1,
            shell: ShellSection {
                name: "adhoc".to_owned(),
                packages: all,
                hook: String::new(),
            },
            env: EnvSection::default(),
            unset: Vec::new(),
            overlays: Vec::new(),
        };
        self.plan_descriptor(&descriptor, None, inherited, options)
    }

    fn plan_descriptor(
        &self,
        descriptor: &DescriptorV1,
        lock_path: Option<&Path>,
        inherited: &BTreeMap<String, String>,
        options: &PlanOptions,
    ) -> Result<PlanResult, CoreError> {
        let normalized = descriptor.normalize()?;

        let base = self.resolver.base_set(&normalized.packages)?;
        let set = base.apply_overlays(&normalized.overlays)?;
        debug!(
            "base set of {} packages via '{}' resolver, {} overlays applied",
            set.len(),
            self.resolver.name(),
            normalized.overlays.len()
        );

        let plan = build_plan(&normalized, &set, inherited)?;

        if options.verify_sources {
            for pkg in &plan.packages {
                if let Some(source) = set.get(&pkg.name).and_then(|d| d.source.as_ref()) {
                    debug!("verifying pinned source of {}", pkg.name);
                    fetch_verified(source)?;
                }
            }
        }

        let lock_file = LockFile::from_resolved(&normalized, plan.locked_packages());

        if options.locked {
            let lock_path = lock_path.ok_or_else(|| {
                CoreError::Lock(LockError::DescriptorDrift(
                    "locked mode requires a descriptor file".to_owned(),
                ))
            })?;
            let existing = LockFile::read_from_file(lock_path)?;
            let _ = existing.verify_integrity()?;
            existing.verify_descriptor_intent(&normalized)?;
            if existing.plan_id != lock_file.plan_id {
                return Err(CoreError::Lock(LockError::DescriptorDrift(format!(
                    "locked mode: lock plan_id '{}' does not match resolved plan_id '{}'",
                    existing.plan_id, lock_file.plan_id
                ))));
            }
        }

        Ok(PlanResult { plan, lock_file })
    }

    /// Write the lock file next to the descriptor. Returns the path written.
    pub fn write_lock(
        &self,
        result: &PlanResult,
        descriptor_path: &Path,
    ) -> Result<PathBuf, CoreError> {
        let lock_path = descriptor_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(LOCK_FILE_NAME);
        result.lock_file.write_to_file(&lock_path)?;
        info!("wrote {}", lock_path.display());
        Ok(lock_path)
    }

    /// Activate a plan: run the hook, then the shell or command.
    pub fn activate(&self, plan: &ActivationPlan, mode: &ActivationMode) -> Result<i32, CoreError> {
        activate::activate(plan, mode)
    }
}
