//! Activation engine for whelk shell environments.
//!
//! This crate ties together descriptor parsing, overlay application, and
//! package resolution into the `Engine` — the central API for checking
//! descriptors, producing activation plans, writing lock files, and entering
//! the resulting environments. Planning is pure with respect to the process
//! environment; nothing is mutated until activation is explicitly triggered.

pub mod activate;
pub mod engine;
pub mod plan;

pub use activate::{activate, ActivationMode};
pub use engine::{Engine, PlanOptions, PlanResult, LOCK_FILE_NAME};
pub use plan::{build_plan, ActivationPlan};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("descriptor error: {0}")]
    Descriptor(#[from] whelk_schema::DescriptorError),
    #[error("lock error: {0}")]
    Lock(#[from] whelk_schema::LockError),
    #[error("resolve error: {0}")]
    Resolve(#[from] whelk_resolver::ResolveError),
    #[error("hook failed with exit code {0}")]
    HookFailed(i32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
