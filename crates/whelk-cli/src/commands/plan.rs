use super::{inherited_env, json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use console::Style;
use std::path::Path;
use whelk_core::{Engine, PlanOptions};

pub fn run(
    engine: &Engine,
    descriptor: &Path,
    options: &PlanOptions,
    write_lock: bool,
    json: bool,
) -> Result<u8, String> {
    let pb = if json {
        None
    } else {
        Some(spinner("resolving plan..."))
    };

    let result = match engine.plan_from_file(descriptor, &inherited_env(), options) {
        Ok(r) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "plan resolved");
            }
            r
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "planning failed");
            }
            return Err(e.to_string());
        }
    };

    if write_lock {
        engine
            .write_lock(&result, descriptor)
            .map_err(|e| e.to_string())?;
    }

    if json {
        println!("{}", json_pretty(&result.plan)?);
    } else {
        let bold = Style::new().bold();
        println!(
            "plan '{}' ({})",
            bold.apply_to(&result.plan.name),
            result.plan.identity.short_id
        );
        if result.plan.packages.is_empty() {
            println!("no packages");
        } else {
            println!("{:<20} {:<14} PREFIX", "PACKAGE", "VERSION");
            for pkg in &result.plan.packages {
                println!(
                    "{:<20} {:<14} {}",
                    pkg.name,
                    pkg.version,
                    pkg.prefix.display()
                );
            }
        }
        if !result.plan.hook.trim().is_empty() {
            println!("hook: present (runs on activation)");
        }
        if write_lock {
            println!("lock: written");
        }
    }
    Ok(EXIT_SUCCESS)
}
