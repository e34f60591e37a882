use super::{json_pretty, EXIT_SUCCESS};
use std::path::Path;
use whelk_core::Engine;

pub fn run(engine: &Engine, descriptor: &Path, json: bool) -> Result<u8, String> {
    let (normalized, identity) = engine.check(descriptor).map_err(|e| e.to_string())?;
    if json {
        let payload = serde_json::json!({
            "name": normalized.name,
            "packages": normalized.packages,
            "env": normalized.env,
            "unset": normalized.unset,
            "overlays": normalized.overlays.len(),
            "hook": !normalized.hook.trim().is_empty(),
            "descriptor_id": identity.plan_id,
            "short_id": identity.short_id,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("descriptor ok: '{}'", normalized.name);
        println!("packages:      {}", normalized.packages.len());
        println!("env vars:      {}", normalized.env.len());
        println!("overlays:      {}", normalized.overlays.len());
        println!(
            "hook:          {}",
            if normalized.hook.trim().is_empty() {
                "none"
            } else {
                "present"
            }
        );
        println!("descriptor_id: {}", identity.short_id);
    }
    Ok(EXIT_SUCCESS)
}
