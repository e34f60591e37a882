use crate::CoreError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;
use whelk_resolver::{resolve_packages, PackageSet, ResolvedPackage};
use whelk_schema::{LockFile, LockedPackage, NormalizedDescriptor, PlanIdentity};

/// A fully resolved activation plan: everything needed to enter the
/// environment, with the hook still unevaluated.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivationPlan {
    pub name: String,
    pub identity: PlanIdentity,
    /// Resolved packages in descriptor declaration order.
    pub packages: Vec<ResolvedPackage>,
    /// Final merged environment: inherited variables minus `unset`, with
    /// descriptor-declared variables overriding, and `PATH` rewritten to
    /// put package bin directories first.
    pub env: BTreeMap<String, String>,
    /// The `<prefix>/bin` entries prepended to the search path, in order.
    pub path_entries: Vec<PathBuf>,
    /// Opaque hook text, executed once at activation.
    pub hook: String,
}

impl ActivationPlan {
    /// Packages as they appear in a lock file (order preserved).
    pub fn locked_packages(&self) -> Vec<LockedPackage> {
        self.packages
            .iter()
            .map(|p| LockedPackage {
                name: p.name.clone(),
                version: p.version.clone(),
            })
            .collect()
    }
}

/// Build an activation plan from a normalized descriptor, a package set
/// (base set with overlays already applied), and the inherited environment.
///
/// Pure: the inherited environment is an explicit input, never read from
/// process globals, and nothing here has side effects.
pub fn build_plan(
    normalized: &NormalizedDescriptor,
    set: &PackageSet,
    inherited: &BTreeMap<String, String>,
) -> Result<ActivationPlan, CoreError> {
    let packages = resolve_packages(&normalized.packages, set)?;

    let path_entries: Vec<PathBuf> = packages.iter().map(|p| p.prefix.join("bin")).collect();

    let mut env = inherited.clone();
    for var in &normalized.unset {
        env.remove(var);
    }
    for (key, value) in &normalized.env {
        env.insert(key.clone(), value.clone());
    }

    if !path_entries.is_empty() {
        let mut parts: Vec<String> = path_entries
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        if let Some(existing) = env.get("PATH") {
            if !existing.is_empty() {
                parts.push(existing.clone());
            }
        }
        env.insert("PATH".to_owned(), parts.join(":"));
    }

    let identity = LockFile::from_resolved(
        normalized,
        packages
            .iter()
            .map(|p| LockedPackage {
                name: p.name.clone(),
                version: p.version.clone(),
            })
            .collect(),
    )
    .compute_identity();

    debug!(
        "planned '{}': {} packages, plan {}",
        normalized.name,
        packages.len(),
        identity.short_id
    );

    Ok(ActivationPlan {
        name: normalized.name.clone(),
        identity,
        packages,
        env,
        path_entries,
        hook: normalized.hook.clone(),
    })
}
