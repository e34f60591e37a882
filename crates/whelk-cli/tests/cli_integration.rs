//! CLI subprocess integration tests.
//!
//! These tests invoke the `whelk` binary as a subprocess and verify exit
//! codes, stdout content, and JSON output stability. The mock resolver
//! keeps everything hermetic; the catalog resolver is exercised against
//! catalogs written into temp dirs.

use std::path::{Path, PathBuf};
use std::process::Command;

fn whelk_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_whelk"))
}

fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

fn write_descriptor(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("whelk.toml");
    std::fs::write(&path, content).unwrap();
    path
}

const DEMO: &str = r#"descriptor_version = 1

[shell]
name = "demo"
packages = ["figlet"]

[env]
MESSAGE = "Hello"
"#;

#[test]
fn cli_version_exits_zero() {
    let out = whelk_bin().arg("--version").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("whelk"));
}

#[test]
fn check_valid_descriptor_exits_zero() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);

    let out = whelk_bin().arg("check").arg(&path).output().unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("demo"));
}

#[test]
fn check_malformed_descriptor_exits_two() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), "this is [ not toml");

    let out = whelk_bin().arg("check").arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn check_duplicate_package_exits_two() {
    let dir = temp_dir();
    let path = write_descriptor(
        dir.path(),
        r#"descriptor_version = 1

[shell]
name = "demo"
packages = ["figlet", "figlet"]
"#,
    );

    let out = whelk_bin().arg("check").arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("figlet"));
}

#[test]
fn check_json_is_stable() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);

    let out = whelk_bin()
        .args(["--json", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["name"], "demo");
    assert_eq!(v["packages"][0], "figlet");
    assert_eq!(v["hook"], false);
}

#[test]
fn plan_json_preserves_declaration_order() {
    let dir = temp_dir();
    let path = write_descriptor(
        dir.path(),
        r#"descriptor_version = 1

[shell]
name = "ordered"
packages = ["zsh", "figlet", "cowsay"]
"#,
    );

    let out = whelk_bin()
        .args(["--resolver", "mock", "--json", "plan"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = v["packages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["zsh", "figlet", "cowsay"]);
}

#[test]
fn plan_unknown_package_exits_three() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(&catalog, "catalog_version = 1\n").unwrap();

    let out = whelk_bin()
        .arg("--catalog")
        .arg(&catalog)
        .arg("plan")
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("figlet"));
}

#[test]
fn plan_resolves_against_catalog() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(
        &catalog,
        r#"catalog_version = 1

[packages.figlet]
version = "2.8.0"
prefix = "/opt/pkgs/figlet-2.8.0"
"#,
    )
    .unwrap();

    let out = whelk_bin()
        .arg("--catalog")
        .arg(&catalog)
        .args(["--json", "plan"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["packages"][0]["version"], "2.8.0");
    let path_env = v["env"]["PATH"].as_str().unwrap();
    assert!(path_env.starts_with("/opt/pkgs/figlet-2.8.0/bin:"));
}

#[test]
fn overlay_pin_shows_up_in_plan() {
    let dir = temp_dir();
    let path = write_descriptor(
        dir.path(),
        r#"descriptor_version = 1

[shell]
name = "pinned"
packages = ["figlet"]

[[overlay]]
package = "figlet"
version = "9.9.9"
"#,
    );
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(
        &catalog,
        r#"catalog_version = 1

[packages.figlet]
version = "2.8.0"
prefix = "/opt/pkgs/figlet"
"#,
    )
    .unwrap();

    let out = whelk_bin()
        .arg("--catalog")
        .arg(&catalog)
        .args(["--json", "plan"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["packages"][0]["version"], "9.9.9");
}

#[test]
fn overlay_unknown_target_exits_three() {
    let dir = temp_dir();
    let path = write_descriptor(
        dir.path(),
        r#"descriptor_version = 1

[shell]
name = "broken"

[[overlay]]
package = "ghost"
version = "1.0"
"#,
    );
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(&catalog, "catalog_version = 1\n").unwrap();

    let out = whelk_bin()
        .arg("--catalog")
        .arg(&catalog)
        .arg("plan")
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("ghost"));
}

#[test]
fn run_executes_command_with_declared_env() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);

    let out = whelk_bin()
        .args(["--resolver", "mock", "run"])
        .arg(&path)
        .args(["--", "sh", "-c", "test \"$MESSAGE\" = Hello"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn run_propagates_command_exit_code() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);

    let out = whelk_bin()
        .args(["--resolver", "mock", "run"])
        .arg(&path)
        .args(["--", "sh", "-c", "exit 5"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn failing_hook_propagates_its_exit_code() {
    let dir = temp_dir();
    let path = write_descriptor(
        dir.path(),
        r#"descriptor_version = 1

[shell]
name = "demo"
hook = "exit 7"
"#,
    );

    let out = whelk_bin()
        .args(["--resolver", "mock", "run"])
        .arg(&path)
        .args(["--", "true"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&out.stderr).contains("hook failed"));
}

#[test]
fn adhoc_run_without_descriptor() {
    let dir = temp_dir();

    let out = whelk_bin()
        .current_dir(dir.path())
        .args(["--resolver", "mock", "run", "-p", "figlet", "--", "sh", "-c", "true"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn adhoc_run_rejects_locked() {
    let dir = temp_dir();

    // No descriptor file exists, so there is no lock to honor; --locked
    // must fail fast rather than silently activating unverified.
    let out = whelk_bin()
        .current_dir(dir.path())
        .args([
            "--resolver", "mock", "run", "--locked", "-p", "figlet", "--", "sh", "-c", "true",
        ])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("requires a descriptor file"));
}

#[test]
fn lock_then_locked_plan_succeeds() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);

    let out = whelk_bin()
        .args(["--resolver", "mock", "lock"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("whelk.lock").exists());

    let out = whelk_bin()
        .args(["--resolver", "mock", "plan", "--locked"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn locked_plan_detects_drift() {
    let dir = temp_dir();
    let path = write_descriptor(dir.path(), DEMO);

    let out = whelk_bin()
        .args(["--resolver", "mock", "lock"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(out.status.success());

    // descriptor changes without re-locking
    write_descriptor(
        dir.path(),
        r#"descriptor_version = 1

[shell]
name = "demo"
packages = ["figlet", "jq"]

[env]
MESSAGE = "Hello"
"#,
    );

    let out = whelk_bin()
        .args(["--resolver", "mock", "plan", "--locked"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("drift"));
}

#[test]
fn presets_lists_builtins() {
    let out = whelk_bin().arg("presets").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("minimal"));
    assert!(stdout.contains("hello"));
}

#[test]
fn presets_json_is_array() {
    let out = whelk_bin().args(["--json", "presets"]).output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(v.as_array().unwrap().len() >= 3);
}

#[test]
fn new_from_preset_writes_descriptor() {
    let dir = temp_dir();

    let out = whelk_bin()
        .current_dir(dir.path())
        .args(["new", "greeting", "--preset", "hello"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let written = std::fs::read_to_string(dir.path().join("whelk.toml")).unwrap();
    assert!(written.contains("figlet"));
    assert!(written.contains("greeting"));

    // the scaffolded descriptor must itself pass check
    let out = whelk_bin()
        .current_dir(dir.path())
        .arg("check")
        .output()
        .unwrap();
    assert!(out.status.success());
}

#[test]
fn new_refuses_overwrite_without_force() {
    let dir = temp_dir();
    write_descriptor(dir.path(), DEMO);

    let out = whelk_bin()
        .current_dir(dir.path())
        .args(["new", "other", "--preset", "minimal"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--force"));
}

#[test]
fn new_unknown_preset_fails() {
    let dir = temp_dir();

    let out = whelk_bin()
        .current_dir(dir.path())
        .args(["new", "x", "--preset", "nonexistent"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown preset"));
}

#[test]
fn completions_generate_for_bash() {
    let out = whelk_bin().args(["completions", "bash"]).output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("whelk"));
}
