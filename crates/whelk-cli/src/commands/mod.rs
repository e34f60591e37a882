pub mod check;
pub mod completions;
pub mod lock;
pub mod new;
pub mod plan;
pub mod presets;
pub mod run;
pub mod shell;

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_DESCRIPTOR_ERROR: u8 = 2;
pub const EXIT_RESOLVE_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Snapshot the process environment once, at the CLI boundary. The planner
/// only ever sees this explicit map.
pub fn inherited_env() -> BTreeMap<String, String> {
    std::env::vars().collect()
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Map activation errors: a failed hook propagates its own exit code, other
/// errors go through the normal error path.
pub fn activation_exit(result: Result<i32, whelk_core::CoreError>) -> Result<u8, String> {
    match result {
        Ok(code) => Ok(clamp_exit(code)),
        Err(whelk_core::CoreError::HookFailed(code)) => {
            // surface the child's code directly rather than a generic failure
            eprintln!("error: hook failed with exit code {code}");
            Ok(clamp_exit(code))
        }
        Err(e) => Err(e.to_string()),
    }
}

fn clamp_exit(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(EXIT_FAILURE)
}
