use crate::normalize::NormalizedDescriptor;
use crate::types::{PlanId, ShortId};
use serde::Serialize;

/// Deterministic identity for an activation plan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanIdentity {
    pub plan_id: PlanId,
    pub short_id: ShortId,
}

/// Compute a **preliminary** identity from unresolved descriptor data.
///
/// This is NOT the canonical plan identity. The canonical identity is
/// computed by [`LockFile::compute_identity()`] after resolution, which uses
/// resolved package versions rather than bare package names.
///
/// This function is used only for:
/// - The `check` command (before resolution has occurred)
/// - Display purposes when no lock file exists
///
/// [`LockFile::compute_identity()`]: crate::lock::LockFile::compute_identity
pub fn compute_descriptor_id(normalized: &NormalizedDescriptor) -> PlanIdentity {
    let mut hasher = blake3::Hasher::new();

    for pkg in &normalized.packages {
        update_token(&mut hasher, &format!("pkg:{pkg}"));
    }
    for (key, value) in &normalized.env {
        update_token(&mut hasher, &format!("env:{key}={value}"));
    }
    for var in &normalized.unset {
        update_token(&mut hasher, &format!("unset:{var}"));
    }
    update_token(&mut hasher, &format!("hook:{}", normalized.hook));
    for overlay in &normalized.overlays {
        update_token(&mut hasher, &format!("overlay:{}", overlay.package));
        if let Some(version) = &overlay.version {
            update_token(&mut hasher, &format!("@{version}"));
        }
        if let Some(source) = &overlay.source {
            update_token(&mut hasher, &format!("src:{}:{}", source.url, source.checksum));
        }
    }

    let hex = hasher.finalize().to_hex().to_string();
    let short = hex[..12].to_owned();

    PlanIdentity {
        plan_id: PlanId::new(hex),
        short_id: ShortId::new(short),
    }
}

/// Feed one token with length framing. Tokens hashed back to back must not
/// run together, or a value ending in one tag's text would alias the next
/// token's content.
pub(crate) fn update_token(hasher: &mut blake3::Hasher, token: &str) {
    hasher.update(&(token.len() as u64).to_le_bytes());
    hasher.update(token.as_bytes());
}
