//! Package-set snapshots, overlay application, and catalog resolution for whelk.
//!
//! This crate implements the resolution layer: immutable `PackageSet`
//! snapshots with ordered overlay application, the pluggable `Resolver`
//! trait with catalog-backed and mock implementations, and pinned-source
//! fetching with checksum verification.

pub mod catalog;
pub mod fetch;
pub mod set;

pub use catalog::{
    parse_catalog_file, parse_catalog_str, select_resolver, CatalogFile, CatalogPackage,
    CatalogResolver, MockResolver, Resolver,
};
pub use fetch::fetch_verified;
pub use set::{resolve_packages, PackageDef, PackageSet, ResolvedPackage};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown package: '{0}'")]
    UnknownPackage(String),
    #[error("overlay references unknown package: '{0}'")]
    UnknownOverlayTarget(String),
    #[error("resolver '{0}' is not available")]
    ResolverUnavailable(String),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported catalog_version: {0}, expected 1")]
    UnsupportedCatalogVersion(u32),
    #[error("fetch failed for '{url}': {reason}")]
    Fetch { url: String, reason: String },
    #[error("checksum mismatch for '{url}': expected {expected}, actual {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },
}
