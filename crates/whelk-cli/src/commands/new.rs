use super::{json_pretty, EXIT_SUCCESS};
use dialoguer::{Confirm, Input};
use std::io::{stderr, stdin, IsTerminal};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use whelk_schema::{get_preset, parse_descriptor_str, DescriptorV1};

const DEST_DESCRIPTOR: &str = "whelk.toml";

fn load_preset(name: &str) -> Result<DescriptorV1, String> {
    let preset = get_preset(name).ok_or_else(|| {
        let known: Vec<&str> = whelk_schema::BUILTIN_PRESETS.iter().map(|p| p.name).collect();
        format!("unknown preset '{name}' (expected: {})", known.join(", "))
    })?;
    parse_descriptor_str(preset.descriptor).map_err(|e| format!("preset parse error: {e}"))
}

fn write_atomic(dest: &Path, content: &str) -> Result<(), String> {
    let dir = dest
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| format!("write temp file: {e}"))?;
    use std::io::Write;
    tmp.write_all(content.as_bytes())
        .map_err(|e| format!("write temp file: {e}"))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| format!("fsync temp file: {e}"))?;
    tmp.persist(dest)
        .map_err(|e| format!("persist descriptor: {}", e.error))?;
    Ok(())
}

fn ensure_can_write(dest: &Path, force: bool, is_tty: bool) -> Result<(), String> {
    if !dest.exists() || force {
        return Ok(());
    }
    if !is_tty {
        return Err(format!(
            "refusing to overwrite existing ./{DEST_DESCRIPTOR} (pass --force)"
        ));
    }
    let overwrite = Confirm::new()
        .with_prompt(format!("overwrite ./{DEST_DESCRIPTOR}?"))
        .default(false)
        .interact()
        .map_err(|e| format!("prompt failed: {e}"))?;
    if overwrite {
        Ok(())
    } else {
        Err(format!(
            "refusing to overwrite existing ./{DEST_DESCRIPTOR} (pass --force)"
        ))
    }
}

fn print_result(name: &str, preset: Option<&str>, json: bool) -> Result<(), String> {
    if json {
        let payload = serde_json::json!({
            "status": "written",
            "path": format!("./{DEST_DESCRIPTOR}"),
            "name": name,
            "preset": preset,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("wrote ./{DEST_DESCRIPTOR} for '{name}'");
        if let Some(p) = preset {
            println!("preset: {p}");
        }
    }
    Ok(())
}

pub fn run(name: &str, preset: Option<&str>, force: bool, json: bool) -> Result<u8, String> {
    let dest = Path::new(DEST_DESCRIPTOR);
    let is_tty = stdin().is_terminal() && stderr().is_terminal();

    let mut descriptor = if let Some(p) = preset {
        let d = load_preset(p)?;
        ensure_can_write(dest, force, is_tty)?;
        d
    } else {
        ensure_can_write(dest, force, is_tty)?;
        if !is_tty {
            return Err("no --preset provided and stdin is not a TTY".to_owned());
        }
        let mut d = load_preset("minimal").map_err(|e| format!("builtin preset broken: {e}"))?;
        let packages: String = Input::new()
            .with_prompt("packages (space-separated, empty to skip)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| format!("prompt failed: {e}"))?;
        d.shell
            .packages
            .extend(packages.split_whitespace().map(str::to_owned));
        let hook: String = Input::new()
            .with_prompt("entry hook (shell command, empty to skip)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| format!("prompt failed: {e}"))?;
        if !hook.trim().is_empty() {
            d.shell.hook = hook;
        }
        d
    };
    descriptor.shell.name = name.to_owned();

    // Reject bad input before writing anything.
    descriptor
        .normalize()
        .map_err(|e| format!("descriptor error: {e}"))?;

    let toml = toml::to_string_pretty(&descriptor)
        .map_err(|e| format!("TOML serialization failed: {e}"))?;
    write_atomic(dest, &toml)?;
    print_result(name, preset, json)?;
    Ok(EXIT_SUCCESS)
}
