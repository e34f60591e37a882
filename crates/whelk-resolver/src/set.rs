use crate::ResolveError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;
use whelk_schema::{NormalizedOverlay, PinnedSource};

/// A concrete installable artifact known to a resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageDef {
    pub version: String,
    /// Install root; `<prefix>/bin` goes onto the activation search path.
    pub prefix: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PinnedSource>,
}

/// An immutable snapshot of the packages a resolver can materialize.
///
/// Overlays never mutate a set in place; they produce a new snapshot, so a
/// base set can be re-used across activations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageSet {
    packages: BTreeMap<String, PackageDef>,
}

impl PackageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, def: PackageDef) {
        self.packages.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&PackageDef> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Apply one overlay, producing a new snapshot.
    ///
    /// The target package must exist in this set; a missing target fails
    /// fast at application time, naming the package.
    pub fn apply_overlay(&self, overlay: &NormalizedOverlay) -> Result<Self, ResolveError> {
        let mut next = self.clone();
        let def = next
            .packages
            .get_mut(&overlay.package)
            .ok_or_else(|| ResolveError::UnknownOverlayTarget(overlay.package.clone()))?;

        if let Some(version) = &overlay.version {
            debug!("overlay pins {} to {version}", overlay.package);
            def.version = version.clone();
        }
        if let Some(source) = &overlay.source {
            debug!("overlay replaces source of {}", overlay.package);
            def.source = Some(source.clone());
        }
        Ok(next)
    }

    /// Apply overlays in declaration order via left fold. Later overlays
    /// observe earlier overlays' results.
    pub fn apply_overlays(&self, overlays: &[NormalizedOverlay]) -> Result<Self, ResolveError> {
        overlays
            .iter()
            .try_fold(self.clone(), |set, overlay| set.apply_overlay(overlay))
    }
}

/// A package resolved against a set: pinned version plus install prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub prefix: PathBuf,
}

/// Resolve declared package names against a set, preserving declaration
/// order. The first unknown name aborts resolution.
pub fn resolve_packages(
    names: &[String],
    set: &PackageSet,
) -> Result<Vec<ResolvedPackage>, ResolveError> {
    names
        .iter()
        .map(|name| {
            let def = set
                .get(name)
                .ok_or_else(|| ResolveError::UnknownPackage(name.clone()))?;
            Ok(ResolvedPackage {
                name: name.clone(),
                version: def.version.clone(),
                prefix: def.prefix.clone(),
            })
        })
        .collect()
}
