use serde::{Deserialize, Serialize};

/// A pinned replacement source for a package: where to fetch it and the
/// blake3 checksum the fetched bytes must match.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PinnedSource {
    pub url: String,
    pub checksum: String,
}

/// One declarative overlay entry: a patch against a single package in the
/// base set. Entries are applied in declaration order; later entries observe
/// the results of earlier ones.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OverlayEntry {
    /// Package the overlay modifies. Must exist in the set it is applied to.
    pub package: String,
    /// Pin the package to an exact version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Replace the package's source with a pinned, checksummed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PinnedSource>,
}

impl OverlayEntry {
    /// True if the entry declares no action at all (neither a version pin
    /// nor a source replacement).
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.source.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entry_detected() {
        let entry = OverlayEntry {
            package: "figlet".to_owned(),
            version: None,
            source: None,
        };
        assert!(entry.is_empty());
    }

    #[test]
    fn version_pin_is_not_empty() {
        let entry = OverlayEntry {
            package: "figlet".to_owned(),
            version: Some("2.8.0".to_owned()),
            source: None,
        };
        assert!(!entry.is_empty());
    }

    #[test]
    fn source_serde_roundtrip() {
        let entry = OverlayEntry {
            package: "figlet".to_owned(),
            version: None,
            source: Some(PinnedSource {
                url: "https://example.org/figlet-2.8.0.tar.gz".to_owned(),
                checksum: "a".repeat(64),
            }),
        };
        let toml = toml::to_string(&entry).unwrap();
        let back: OverlayEntry = toml::from_str(&toml).unwrap();
        assert_eq!(entry, back);
    }
}
