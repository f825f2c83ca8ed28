//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("workload interference"),
        "Should show app description"
    );
    assert!(stdout.contains("apps"), "Should show apps command");
    assert!(
        stdout.contains("calibration"),
        "Should show calibration command"
    );
    assert!(stdout.contains("profiling"), "Should show profiling command");
    assert!(
        stdout.contains("interference"),
        "Should show interference command"
    );
    assert!(stdout.contains("placement"), "Should show placement command");
    assert!(stdout.contains("preview"), "Should show preview command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("wic"), "Should show binary name");
}

/// Test calibration subcommand help
#[test]
fn test_calibration_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "calibration", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Calibration help should succeed");
    assert!(stdout.contains("APP_ID"), "Should show app id argument");
    assert!(stdout.contains("--refresh"), "Should show refresh option");
}

/// Test profiling subcommand help
#[test]
fn test_profiling_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "profiling", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Profiling help should succeed");
    assert!(stdout.contains("APP_ID"), "Should show app id argument");
    assert!(stdout.contains("SERVICE"), "Should show service argument");
}

/// Test placement subcommand help
#[test]
fn test_placement_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "placement", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Placement help should succeed");
    assert!(
        stdout.contains("--recommended"),
        "Should show recommended option"
    );
}

/// Test format option
#[test]
fn test_format_option() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test api-url option
#[test]
fn test_api_url_option() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("WIC_API_URL"), "Should show env var");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "invalid-command"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// Test missing required argument error handling
#[test]
fn test_missing_argument() {
    let output = Command::new("cargo")
        .args(["run", "-p", "wic-cli", "--", "profiling", "app-1"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Missing argument should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing argument"
    );
}
