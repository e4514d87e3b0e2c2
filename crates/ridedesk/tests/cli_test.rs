//! Integration tests for the `ridedesk` CLI binary.
//!
//! These cover argument parsing, help output, shell completions, config
//! file handling and error exit codes without a running backend.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ridedesk` binary with env isolation.
///
/// Clears all `RIDEDESK_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn ridedesk_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ridedesk");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("RIDEDESK_PROFILE")
        .env_remove("RIDEDESK_API_URL")
        .env_remove("RIDEDESK_TOKEN")
        .env_remove("RIDEDESK_OUTPUT")
        .env_remove("RIDEDESK_INSECURE")
        .env_remove("RIDEDESK_TIMEOUT")
        .env_remove("RIDEDESK_CONFIG")
        .env_remove("RIDEDESK_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn ridedesk_cmd() -> assert_cmd::Command {
    ridedesk_in(Path::new("/tmp/ridedesk-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ridedesk_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    ridedesk_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("drivers")
            .and(predicate::str::contains("vehicles"))
            .and(predicate::str::contains("promo"))
            .and(predicate::str::contains("notifications")),
    );
}

#[test]
fn test_version_flag() {
    ridedesk_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ridedesk"));
}

#[test]
fn test_subcommand_help_lists_actions() {
    ridedesk_cmd()
        .args(["drivers", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("approve")
                .and(predicate::str::contains("reject"))
                .and(predicate::str::contains("delete")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    ridedesk_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    ridedesk_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    ridedesk_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ridedesk"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = ridedesk_cmd().arg("nonexistent").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    let output = ridedesk_cmd()
        .args(["--output", "xml", "drivers", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("xml"), "Expected 'xml' in error:\n{text}");
}

#[test]
fn test_page_must_be_positive() {
    let output = ridedesk_cmd()
        .args(["drivers", "list", "--page", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_promo_status_is_checked() {
    let output = ridedesk_cmd()
        .args([
            "promo", "create", "--discount", "10", "--start", "2025-01-01", "--expiry",
            "2025-02-01", "--status", "paused",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Missing config / credentials ────────────────────────────────────

#[test]
fn test_list_without_config_fails() {
    let output = ridedesk_cmd().args(["drivers", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("config"),
        "Expected a config hint in output:\n{text}"
    );
}

#[test]
fn test_list_without_token_is_an_auth_error() {
    let output = ridedesk_cmd()
        .args(["--api-url", "http://127.0.0.1:9", "drivers", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("login"), "Expected a login hint:\n{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let output = ridedesk_cmd()
        .args(["--profile", "staging", "stats"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("staging"), "Expected profile name:\n{text}");
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    ridedesk_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_then_profiles_and_show() {
    let home = tempfile::tempdir().unwrap();

    ridedesk_in(home.path())
        .args(["config", "set", "api_url", "http://localhost:5000"])
        .assert()
        .success();
    ridedesk_in(home.path())
        .args(["config", "set", "notification_poll", "15s"])
        .assert()
        .success();

    ridedesk_in(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));

    ridedesk_in(home.path())
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://localhost:5000")
                .and(predicate::str::contains("15s")),
        );
}

#[test]
fn test_config_set_rejects_bad_values() {
    let home = tempfile::tempdir().unwrap();

    ridedesk_in(home.path())
        .args(["config", "set", "api_url", "http://localhost:5000"])
        .assert()
        .success();

    let output = ridedesk_in(home.path())
        .args(["config", "set", "gc_time", "later"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = ridedesk_in(home.path())
        .args(["config", "set", "colour", "red"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_set_on_missing_profile_needs_url_first() {
    let home = tempfile::tempdir().unwrap();
    let output = ridedesk_in(home.path())
        .args(["config", "set", "timeout", "10s"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_config_use_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = ridedesk_in(home.path())
        .args(["config", "use", "prod"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("prod"), "Expected profile name:\n{text}");
}

#[test]
fn test_config_env_override_and_unknown_profile_hint() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("elsewhere").join("ridedesk.toml");

    ridedesk_in(home.path())
        .env("RIDEDESK_CONFIG", &file)
        .args(["config", "set", "api-url", "https://api.example.com"])
        .assert()
        .success();
    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("https://api.example.com"));

    let output = ridedesk_in(home.path())
        .env("RIDEDESK_CONFIG", &file)
        .args(["config", "use", "prod"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(text.contains("default"), "Expected known profiles:\n{text}");
}

#[test]
fn test_driver_status_filter_is_checked() {
    let output = ridedesk_cmd()
        .args(["drivers", "list", "--status", "suspended"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    ridedesk_cmd()
        .args(["drivers", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"));
}
