//! Descriptor parsing, normalization, plan identity, and lock file for whelk.
//!
//! This crate defines the schema layer: TOML descriptor parsing
//! (`DescriptorV1`), normalized representations (`NormalizedDescriptor`),
//! deterministic plan identity computation (`compute_descriptor_id`), lock
//! file generation/verification (`LockFile`), and built-in preset
//! definitions.

pub mod descriptor;
pub mod identity;
pub mod lock;
pub mod normalize;
pub mod overlay;
pub mod preset;
pub mod types;

pub use descriptor::{
    parse_descriptor_file, parse_descriptor_str, DescriptorError, DescriptorV1, EnvSection,
    ShellSection,
};
pub use identity::{compute_descriptor_id, PlanIdentity};
pub use lock::{LockError, LockFile, LockedPackage};
pub use normalize::{NormalizedDescriptor, NormalizedOverlay};
pub use overlay::{OverlayEntry, PinnedSource};
pub use preset::{get_preset, list_presets, Preset, BUILTIN_PRESETS};
pub use types::{PlanId, ShortId};
