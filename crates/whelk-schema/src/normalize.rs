use crate::descriptor::{DescriptorError, DescriptorV1};
use crate::overlay::PinnedSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical, validated representation of a parsed descriptor.
///
/// Package declaration order is preserved: it carries through unchanged into
/// the activation plan and the search path. Duplicate declarations are
/// rejected here rather than resolved by last-write-wins, because the
/// underlying semantics would be unspecified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedDescriptor {
    pub descriptor_version: u32,
    pub name: String,
    pub packages: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub unset: Vec<String>,
    pub hook: String,
    pub overlays: Vec<NormalizedOverlay>,
}

/// A validated overlay entry with guaranteed non-empty package and at least
/// one action. Order within `overlays` is significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedOverlay {
    pub package: String,
    pub version: Option<String>,
    pub source: Option<PinnedSource>,
}

impl DescriptorV1 {
    /// Normalize the descriptor: validate fields, reject duplicates, trim
    /// whitespace. Fails fast before any package resolution is attempted.
    pub fn normalize(&self) -> Result<NormalizedDescriptor, DescriptorError> {
        if self.descriptor_version != 1 {
            return Err(DescriptorError::UnsupportedVersion(self.descriptor_version));
        }

        let name = self.shell.name.trim().to_owned();
        if name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        let mut packages = Vec::with_capacity(self.shell.packages.len());
        let mut seen = BTreeSet::new();
        for raw in &self.shell.packages {
            let pkg = raw.trim().to_owned();
            if pkg.is_empty() {
                return Err(DescriptorError::EmptyPackage);
            }
            if !seen.insert(pkg.clone()) {
                return Err(DescriptorError::DuplicatePackage(pkg));
            }
            packages.push(pkg);
        }

        let mut env = BTreeMap::new();
        for (key, value) in &self.env.entries {
            let trimmed = key.trim().to_owned();
            if trimmed.is_empty() || trimmed.contains('=') {
                return Err(DescriptorError::InvalidEnvName(key.clone()));
            }
            env.insert(trimmed, value.clone());
        }

        let mut unset: Vec<String> = self
            .unset
            .iter()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .collect();
        unset.sort();
        unset.dedup();

        let mut overlays = Vec::with_capacity(self.overlays.len());
        for entry in &self.overlays {
            let package = entry.package.trim().to_owned();
            if package.is_empty() {
                return Err(DescriptorError::EmptyOverlayPackage);
            }
            if entry.is_empty() {
                return Err(DescriptorError::EmptyOverlay(package));
            }
            if let Some(source) = &entry.source {
                validate_checksum(&package, &source.checksum)?;
            }
            overlays.push(NormalizedOverlay {
                package,
                version: entry.version.as_deref().map(|v| v.trim().to_owned()),
                source: entry.source.clone(),
            });
        }

        Ok(NormalizedDescriptor {
            descriptor_version: self.descriptor_version,
            name,
            packages,
            env,
            unset,
            hook: self.shell.hook.clone(),
            overlays,
        })
    }
}

impl NormalizedDescriptor {
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn validate_checksum(package: &str, checksum: &str) -> Result<(), DescriptorError> {
    if checksum.len() != 64 || !checksum.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DescriptorError::InvalidChecksum {
            package: package.to_owned(),
            checksum: checksum.to_owned(),
        });
    }
    Ok(())
}
