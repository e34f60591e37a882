use crate::overlay::OverlayEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse descriptor: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported descriptor_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("shell.name must not be empty")]
    EmptyName,
    #[error("package name must not be empty")]
    EmptyPackage,
    #[error("duplicate package declaration: '{0}'")]
    DuplicatePackage(String),
    #[error("invalid environment variable name: '{0}'")]
    InvalidEnvName(String),
    #[error("overlay for '{0}' declares neither a version pin nor a source")]
    EmptyOverlay(String),
    #[error("overlay package must not be empty")]
    EmptyOverlayPackage,
    #[error("invalid checksum for '{package}': '{checksum}' (expected 64 hex chars)")]
    InvalidChecksum { package: String, checksum: String },
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DescriptorV1 {
    pub descriptor_version: u32,
    /// Inherited variables removed at activation. Top-level so it serializes
    /// before the tables below.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
    pub shell: ShellSection,
    #[serde(default)]
    pub env: EnvSection,
    #[serde(default, rename = "overlay", skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<OverlayEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShellSection {
    pub name: String,
    #[serde(default)]
    pub packages: Vec<String>,
    /// Opaque shell script text, executed once on activation. Never parsed
    /// or evaluated by the loader.
    #[serde(default)]
    pub hook: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EnvSection {
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

pub fn parse_descriptor_str(input: &str) -> Result<DescriptorV1, DescriptorError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_descriptor_file(path: impl AsRef<Path>) -> Result<DescriptorV1, DescriptorError> {
    let content = fs::read_to_string(path)?;
    parse_descriptor_str(&content)
}
