use crate::set::{PackageDef, PackageSet};
use crate::ResolveError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use whelk_schema::PinnedSource;

/// On-disk catalog format: the installed universe a resolver can draw from.
///
/// Stands in for the external package manager's database. Whoever installs
/// packages writes this file; whelk only reads it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub catalog_version: u32,
    #[serde(default)]
    pub packages: BTreeMap<String, CatalogPackage>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogPackage {
    pub version: String,
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PinnedSource>,
}

pub fn parse_catalog_str(input: &str) -> Result<CatalogFile, ResolveError> {
    let catalog: CatalogFile = toml::from_str(input)?;
    if catalog.catalog_version != 1 {
        return Err(ResolveError::UnsupportedCatalogVersion(
            catalog.catalog_version,
        ));
    }
    Ok(catalog)
}

pub fn parse_catalog_file(path: impl AsRef<Path>) -> Result<CatalogFile, ResolveError> {
    let content = fs::read_to_string(path)?;
    parse_catalog_str(&content)
}

impl CatalogFile {
    pub fn into_package_set(self) -> PackageSet {
        let mut set = PackageSet::new();
        for (name, pkg) in self.packages {
            set.insert(
                name,
                PackageDef {
                    version: pkg.version,
                    prefix: PathBuf::from(pkg.prefix),
                    source: pkg.source,
                },
            );
        }
        set
    }
}

/// The external-resolver seam: produces the base package set against which
/// a descriptor's declarations are resolved.
pub trait Resolver: Send + Sync {
    fn name(&self) -> &str;

    /// Build the base set. `requested` lists the package names the caller
    /// is about to resolve; real resolvers ignore it and return their full
    /// universe, the mock resolver synthesizes entries from it.
    fn base_set(&self, requested: &[String]) -> Result<PackageSet, ResolveError>;
}

/// Resolver backed by a TOML catalog file on disk.
pub struct CatalogResolver {
    path: PathBuf,
}

impl CatalogResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Resolver for CatalogResolver {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn base_set(&self, _requested: &[String]) -> Result<PackageSet, ResolveError> {
        let catalog = parse_catalog_file(&self.path)?;
        debug!(
            "loaded catalog {} with {} packages",
            self.path.display(),
            catalog.packages.len()
        );
        Ok(catalog.into_package_set())
    }
}

/// Deterministic synthetic resolver for tests and dry runs: every requested
/// name resolves to version `0.0.0-mock` with a prefix under `root`.
pub struct MockResolver {
    root: PathBuf,
}

impl MockResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Resolver for MockResolver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn base_set(&self, requested: &[String]) -> Result<PackageSet, ResolveError> {
        let mut set = PackageSet::new();
        for name in requested {
            set.insert(
                name.clone(),
                PackageDef {
                    version: "0.0.0-mock".to_owned(),
                    prefix: self.root.join(name),
                    source: None,
                },
            );
        }
        Ok(set)
    }
}

pub fn select_resolver(
    name: &str,
    catalog_path: &Path,
) -> Result<Box<dyn Resolver>, ResolveError> {
    match name {
        "catalog" => Ok(Box::new(CatalogResolver::new(catalog_path))),
        "mock" => Ok(Box::new(MockResolver::new(
            catalog_path.parent().unwrap_or(Path::new(".")).join("mock"),
        ))),
        other => Err(ResolveError::ResolverUnavailable(other.to_owned())),
    }
}
