use super::{inherited_env, json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use std::path::Path;
use whelk_core::{Engine, PlanOptions};

pub fn run(
    engine: &Engine,
    descriptor: &Path,
    options: &PlanOptions,
    json: bool,
) -> Result<u8, String> {
    let pb = if json {
        None
    } else {
        Some(spinner("resolving and locking..."))
    };

    let outcome = engine
        .plan_from_file(descriptor, &inherited_env(), options)
        .and_then(|result| {
            let path = engine.write_lock(&result, descriptor)?;
            Ok((result, path))
        });

    let (result, lock_path) = match outcome {
        Ok(v) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "lock written");
            }
            v
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "locking failed");
            }
            return Err(e.to_string());
        }
    };

    if json {
        let payload = serde_json::json!({
            "plan_id": result.lock_file.plan_id,
            "short_id": result.lock_file.short_id,
            "path": lock_path,
            "packages": result.lock_file.packages.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("wrote {}", lock_path.display());
        println!("plan_id: {}", result.lock_file.plan_id);
    }
    Ok(EXIT_SUCCESS)
}
