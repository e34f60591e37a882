use crate::plan::ActivationPlan;
use crate::CoreError;
use std::process::Command;
use tracing::{debug, info};

/// What to do after the hook has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationMode {
    /// Spawn an interactive shell (`$SHELL` from the plan environment,
    /// falling back to `/bin/sh`).
    Interactive,
    /// Run a single command non-interactively.
    Command(Vec<String>),
}

/// Activate a plan: run the hook, then enter the shell or command.
///
/// The hook runs after the search path is assembled and before control
/// returns to the user. A non-zero hook exit aborts activation with
/// [`CoreError::HookFailed`]; there are no rollback semantics. On success
/// the child's exit code is returned.
pub fn activate(plan: &ActivationPlan, mode: &ActivationMode) -> Result<i32, CoreError> {
    if !plan.hook.trim().is_empty() {
        debug!("running hook for '{}'", plan.name);
        let status = Command::new("sh")
            .arg("-c")
            .arg(&plan.hook)
            .env_clear()
            .envs(&plan.env)
            .status()?;
        if !status.success() {
            let code = status.code().unwrap_or(1);
            return Err(CoreError::HookFailed(code));
        }
    }

    let status = match mode {
        ActivationMode::Interactive => {
            let shell = plan
                .env
                .get("SHELL")
                .cloned()
                .unwrap_or_else(|| "/bin/sh".to_owned());
            info!("entering '{}' with {shell}", plan.name);
            Command::new(shell)
                .env_clear()
                .envs(&plan.env)
                .status()?
        }
        ActivationMode::Command(argv) => {
            debug!("running command in '{}': {}", plan.name, argv.join(" "));
            let (program, args) = argv
                .split_first()
                .ok_or_else(|| CoreError::Io(std::io::Error::other("empty command")))?;
            Command::new(program)
                .args(args)
                .env_clear()
                .envs(&plan.env)
                .status()?
        }
    };

    Ok(status.code().unwrap_or(1))
}
