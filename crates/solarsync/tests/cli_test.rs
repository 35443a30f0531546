//! Integration tests for the `solarsync` CLI binary.
//!
//! Argument parsing, help output, completions, configuration errors and
//! their exit codes. Nothing here needs a live vendor API.
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation: no user config, no inherited
/// `SOLARSYNC_*` overrides.
fn solarsync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("solarsync");
    cmd.env("HOME", "/tmp/solarsync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/solarsync-cli-test-nonexistent")
        .env_remove("SOLARSYNC_CONFIG")
        .env_remove("SOLARSYNC_INGEST__API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

// Port 1 on loopback refuses connections immediately.
const UNREACHABLE_SET: &str = r#"
[[credentials]]
host = "site-a"
base_url = "http://127.0.0.1:1/openApi"
user = "api-user"
password = "super-secret"
"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = solarsync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected 'Usage' in:\n{stderr}");
}

#[test]
fn test_help_lists_commands() {
    solarsync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("plants"))
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    solarsync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("solarsync"));
}

#[test]
fn test_completions_bash() {
    solarsync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    solarsync_cmd()
        .args(["--config", "/etc/solarsync/custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/solarsync/custom.toml"));
}

#[test]
fn test_config_show_redacts_password() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, UNREACHABLE_SET);

    solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("site-a")
                .and(predicate::str::contains("[REDACTED]"))
                .and(predicate::str::contains("super-secret").not()),
        );
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_config_file_exit_code() {
    solarsync_cmd()
        .args(["--config", "/tmp/solarsync-cli-test-nonexistent/none.toml", "run"])
        .assert()
        .code(4);
}

#[test]
fn test_default_config_absent_exit_code() {
    solarsync_cmd().args(["run", "--dry-run"]).assert().code(4);
}

#[test]
fn test_no_credentials_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[fetch]\nbatch_pause_secs = 1\n");

    solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["run", "--dry-run"])
        .assert()
        .code(5);
}

#[test]
fn test_invalid_base_url_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [[credentials]]
        host = "site-a"
        base_url = "not a url"
        user = "u"
        password = "p"
        "#,
    );

    solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["run", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_run_without_ingest_requires_dry_run() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, UNREACHABLE_SET);

    solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ingest.base_url"));
}

#[test]
fn test_unknown_host_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, UNREACHABLE_SET);

    solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["run", "--dry-run", "--host", "site-z"])
        .assert()
        .code(4);
}

// ── Run behavior ────────────────────────────────────────────────────

#[test]
fn test_failed_set_still_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, UNREACHABLE_SET);

    solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--color", "never", "run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("site-a").and(predicate::str::contains("failed")));
}

#[test]
fn test_run_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, UNREACHABLE_SET);

    let output = solarsync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "json", "run", "--dry-run"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["host"], "site-a");
    assert_eq!(rows[0]["status"], "failed (NotStarted)");
}
