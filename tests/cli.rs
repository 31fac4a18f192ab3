//! Runs the `taskboard` binary and checks its exit codes

use std::path::Path;
use std::process::{Command, Output};

use taskboard::page::ACCESS_DENIED;

fn write_settings(dir: &Path, require_passphrase: bool) -> std::path::PathBuf {
    let settings = serde_json::json!({
        "require_passphrase": require_passphrase,
        "secrets_file": dir.join("secrets.json"),
        "color": false,
    });
    let path = dir.join("taskboard.json");
    std::fs::write(&path, settings.to_string()).unwrap();
    path
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskboard"))
        .arg("--config").arg(config)
        .args(args)
        .env_remove("TODOIST_API_TOKEN")
        .output()
        .unwrap()
}

#[test]
fn home_page_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), true);

    let output = run(&config, &["home"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dashboards for your Google Tasks and Todoist tasks"));
}

#[test]
fn denied_dashboard_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), true);

    let output = run(&config, &["todoist", "--passphrase", "wrong"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains(ACCESS_DENIED));
}

#[test]
fn missing_token_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), false);

    // No token anywhere, and JSON output never prompts
    let output = run(&config, &["todoist", "--json"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Warning: "));
}

#[test]
fn usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), false);

    let output = run(&config, &["--status"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}
