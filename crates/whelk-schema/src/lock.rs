use crate::descriptor::DescriptorError;
use crate::identity::PlanIdentity;
use crate::normalize::NormalizedDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("lock file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lock file parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("lock file serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("lock file plan_id mismatch: lock has '{lock_id}', recomputed '{computed_id}'")]
    PlanIdMismatch {
        lock_id: String,
        computed_id: String,
    },
    #[error("lock file descriptor drift: {0}")]
    DescriptorDrift(String),
}

/// A package with its resolved, pinned version as recorded in the lock file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
}

/// The lock file captures the fully resolved state of an activation plan.
///
/// The plan_id is computed deterministically from the locked fields, not
/// from unresolved descriptor data. This guarantees:
///   same lock file → same plan_id → same environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockFile {
    pub lock_version: u32,
    pub plan_id: String,
    pub short_id: String,

    pub name: String,
    pub generated_at: String,

    /// Resolved packages in descriptor declaration order.
    pub packages: Vec<LockedPackage>,

    /// Environment variables declared by the descriptor.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Inherited variables removed at activation.
    #[serde(default)]
    pub unset: Vec<String>,

    /// Hook text, recorded verbatim and never evaluated here.
    #[serde(default)]
    pub hook: String,
}

impl LockFile {
    /// Generate a lock file from a normalized descriptor and resolved
    /// package versions. Package order must be descriptor declaration order.
    pub fn from_resolved(normalized: &NormalizedDescriptor, packages: Vec<LockedPackage>) -> Self {
        let lock = LockFile {
            lock_version: 1,
            plan_id: String::new(), // computed below
            short_id: String::new(),
            name: normalized.name.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            packages,
            env: normalized.env.clone(),
            unset: normalized.unset.clone(),
            hook: normalized.hook.clone(),
        };

        let identity = lock.compute_identity();
        LockFile {
            plan_id: identity.plan_id.into_inner(),
            short_id: identity.short_id.into_inner(),
            ..lock
        }
    }

    /// Compute the plan identity from the locked state.
    ///
    /// This is the canonical hash computation. It uses only resolved,
    /// pinned data, never bare package names. The generation timestamp is
    /// deliberately excluded: re-locking an unchanged plan keeps its id.
    pub fn compute_identity(&self) -> PlanIdentity {
        use crate::identity::update_token;

        let mut hasher = blake3::Hasher::new();

        // Packages in plan order: name@version
        for pkg in &self.packages {
            update_token(&mut hasher, &format!("pkg:{}@{}", pkg.name, pkg.version));
        }

        for (key, value) in &self.env {
            update_token(&mut hasher, &format!("env:{key}={value}"));
        }
        for var in &self.unset {
            update_token(&mut hasher, &format!("unset:{var}"));
        }
        update_token(&mut hasher, &format!("hook:{}", self.hook));

        let hex = hasher.finalize().to_hex().to_string();
        let short = hex[..12].to_owned();

        PlanIdentity {
            plan_id: crate::types::PlanId::new(hex),
            short_id: crate::types::ShortId::new(short),
        }
    }

    /// Verify that this lock file is internally consistent
    /// (stored plan_id matches recomputed plan_id).
    pub fn verify_integrity(&self) -> Result<PlanIdentity, LockError> {
        let identity = self.compute_identity();
        if self.plan_id != identity.plan_id.as_str() {
            return Err(LockError::PlanIdMismatch {
                lock_id: self.plan_id.clone(),
                computed_id: identity.plan_id.into_inner(),
            });
        }
        Ok(identity)
    }

    /// Check that a descriptor's declared intent matches this lock file.
    ///
    /// This catches cases where the descriptor changed but the lock wasn't
    /// regenerated.
    pub fn verify_descriptor_intent(
        &self,
        normalized: &NormalizedDescriptor,
    ) -> Result<(), LockError> {
        if self.name != normalized.name {
            return Err(LockError::DescriptorDrift(format!(
                "name changed: lock has '{}', descriptor has '{}'",
                self.name, normalized.name
            )));
        }

        let locked_names: Vec<&str> = self.packages.iter().map(|p| p.name.as_str()).collect();
        let declared_names: Vec<&str> = normalized.packages.iter().map(String::as_str).collect();
        if locked_names != declared_names {
            return Err(LockError::DescriptorDrift(format!(
                "packages changed: lock has [{}], descriptor has [{}]. Run 'whelk lock' to re-resolve.",
                locked_names.join(", "),
                declared_names.join(", ")
            )));
        }

        if self.env != normalized.env {
            return Err(LockError::DescriptorDrift(
                "environment variables changed. Run 'whelk lock' to re-resolve.".to_owned(),
            ));
        }
        if self.unset != normalized.unset {
            return Err(LockError::DescriptorDrift(
                "unset list changed. Run 'whelk lock' to re-resolve.".to_owned(),
            ));
        }
        if self.hook != normalized.hook {
            return Err(LockError::DescriptorDrift(
                "hook changed. Run 'whelk lock' to re-resolve.".to_owned(),
            ));
        }

        Ok(())
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), LockError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| LockError::Io(e.error))?;
        // Fsync parent directory to ensure rename durability on power loss.
        if let Ok(f) = fs::File::open(dir) {
            let _ = f.sync_all();
        }
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
