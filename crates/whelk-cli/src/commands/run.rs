use super::{activation_exit, inherited_env};
use std::path::Path;
use whelk_core::{ActivationMode, Engine, PlanOptions};

pub fn run(
    engine: &Engine,
    descriptor: &Path,
    locked: bool,
    packages: Vec<String>,
    command: &[String],
) -> Result<u8, String> {
    let inherited = inherited_env();
    let options = PlanOptions {
        locked,
        verify_sources: false,
        extra_packages: packages.clone(),
    };

    // --locked still applies on the ad-hoc path; an ad-hoc plan has no
    // lock file to honor, so it fails fast instead of activating.
    let result = if !descriptor.exists() && !packages.is_empty() {
        let adhoc_options = PlanOptions {
            locked,
            ..PlanOptions::default()
        };
        engine
            .plan_adhoc(&packages, &inherited, &adhoc_options)
            .map_err(|e| e.to_string())?
    } else {
        engine
            .plan_from_file(descriptor, &inherited, &options)
            .map_err(|e| e.to_string())?
    };

    activation_exit(engine.activate(&result.plan, &ActivationMode::Command(command.to_vec())))
}
