//! End-to-end CLI tests for the webstore-publish binary.

use assert_cmd::Command;
use predicates::prelude::*;

const ENV_VARS: [&str; 7] = [
    "CLIENT_ID",
    "CLIENT_SECRET",
    "REFRESH_TOKEN",
    "EXTENSION_ID",
    "FILE_PATH",
    "PUBLISH",
    "GITHUB_ACTIONS",
];

fn command(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("webstore-publish").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    for name in ENV_VARS {
        cmd.env_remove(name);
    }
    cmd
}

fn with_valid_env(cmd: &mut Command) -> &mut Command {
    cmd.env("CLIENT_ID", "client-id-1234567890")
        .env("CLIENT_SECRET", "client-secret-123456")
        .env("REFRESH_TOKEN", "1//refresh-token-abcdef")
        .env("EXTENSION_ID", "abcdefghijklmnopabcdefghijklmnop")
        .env("FILE_PATH", "extension.zip")
}

#[test]
fn test_binary_help_displays_usage() {
    let dir = tempfile::tempdir().unwrap();
    command(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chrome Web Store"));
}

#[test]
fn test_binary_missing_env_fails() {
    let dir = tempfile::tempdir().unwrap();
    command(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing CLIENT_ID environment variable"));
}

#[test]
fn test_binary_uppercase_extension_id_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("extension.zip"), b"zip").unwrap();

    let mut cmd = command(&dir);
    with_valid_env(&mut cmd)
        .env("EXTENSION_ID", "ABCDEFGHIJKLMNOPABCDEFGHIJKLMNOP")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Must be 32 lowercase letters"));
}

#[test]
fn test_binary_missing_package_fails_validation() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = command(&dir);
    with_valid_env(&mut cmd)
        .args(["--file", "dist/missing.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_binary_file_flag_stands_in_for_missing_file_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ext.txt"), b"zip").unwrap();

    let mut cmd = command(&dir);
    with_valid_env(&mut cmd)
        .env_remove("FILE_PATH")
        .args(["--file", "ext.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid file type"))
        .stderr(predicate::str::contains("FILE_PATH").not());
}

#[test]
fn test_binary_dotenv_log_level_applies_to_logging() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "RUST_LOG=debug\n").unwrap();

    command(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("loaded .env file"))
        .stderr(predicate::str::contains("missing CLIENT_ID environment variable"));
}

#[test]
fn test_binary_emits_workflow_error_under_github_actions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("extension.txt"), b"zip").unwrap();

    let mut cmd = command(&dir);
    with_valid_env(&mut cmd)
        .env("FILE_PATH", "extension.txt")
        .env("GITHUB_ACTIONS", "true")
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("::error::"))
        .stdout(predicate::str::contains("Invalid file type"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    command(&dir)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
