//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("vetboard").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("vetboard").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_migrate_list_needs_no_database() {
    let mut cmd = Command::cargo_bin("vetboard").unwrap();
    cmd.arg("migrate").arg("--list").env_remove("DATABASE_URL");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("users"));
}

#[test]
fn test_serve_without_secret_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vetboard.toml");
    std::fs::write(&config, "database_url = \"postgres://127.0.0.1:1/none\"\n").unwrap();

    let mut cmd = Command::cargo_bin("vetboard").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("serve")
        .env_remove("VETBOARD_JWT_SECRET")
        .env_remove("DATABASE_URL")
        .current_dir(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("VETBOARD_JWT_SECRET"));
}

#[test]
fn test_unknown_command_fails() {
    let mut cmd = Command::cargo_bin("vetboard").unwrap();
    cmd.arg("bogus");

    cmd.assert().failure();
}
