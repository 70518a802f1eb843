//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomoweb"))
        .args(args)
        .env("POMOWEB_DATA_DIR", data_dir)
        .env_remove("POMOWEB_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed {:?}: {}", args, stderr);
    stdout
}

#[test]
fn test_settings_list_shows_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["settings", "list"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["pomodoro"], 25);
    assert_eq!(json["shortBreak"], 5);
    assert_eq!(json["longBreak"], 15);
    assert_eq!(json["autoStartBreaks"], false);
    assert_eq!(json["autoStartPomodoros"], false);
    assert_eq!(json["soundEnabled"], true);
}

#[test]
fn test_settings_set_persists_and_status_reflects_it() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(dir.path(), &["settings", "set", "pomodoro", "10"]).trim(),
        "ok"
    );
    assert_eq!(
        run_cli_success(dir.path(), &["settings", "get", "pomodoro"]).trim(),
        "10"
    );

    let stdout = run_cli_success(dir.path(), &["status", "--view"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["snapshot"]["remainingSeconds"], 600);
    assert_eq!(json["view"]["clock"], "10:00");

    let saved = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["pomodoro"], 10);
}

#[test]
fn test_status_for_break_modes() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["status", "--mode", "short-break"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["mode"], "short-break");
    assert_eq!(json["remainingSeconds"], 300);
    assert_eq!(json["sessionNumber"], 1);
    assert_eq!(json["running"], false);
}

#[test]
fn test_settings_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["settings", "set", "theme", "dark"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown settings key"));

    let (_, stderr, code) = run_cli(dir.path(), &["settings", "set", "pomodoro", "ten"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid value"));

    let (_, _, code) = run_cli(dir.path(), &["settings", "get", "volume"]);
    assert_ne!(code, 0);
}

#[test]
fn test_malformed_settings_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
    assert_eq!(
        run_cli_success(dir.path(), &["settings", "get", "pomodoro"]).trim(),
        "25"
    );
}

#[test]
fn test_settings_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["settings", "set", "longBreak", "30"]);
    run_cli_success(dir.path(), &["settings", "reset"]);
    assert_eq!(
        run_cli_success(dir.path(), &["settings", "get", "longBreak"]).trim(),
        "15"
    );
}

#[test]
fn test_run_renders_initial_frame_and_quits() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomoweb"))
        .args(["run", "--no-desktop", "--mode", "long-break"])
        .env("POMOWEB_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"q\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Long Break"));
    assert!(stdout.contains("15:00"));
    assert!(stdout.contains("(Start)"));
}
