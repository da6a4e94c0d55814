//! Integration tests for the command-line interface.
//!
//! These tests run the binary for configuration validation and the one-off
//! subcommands, which never start the HTTP server.

use std::io::Write;
use tempfile::NamedTempFile;

/// Helper to get the binary path
fn binary_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_hindsight-exporter"))
}

fn run(args: &[&str]) -> (bool, String, String) {
    let output = std::process::Command::new(binary_path())
        .args(args)
        .output()
        .expect("Failed to execute command");

    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_check_config_defaults() {
    let (ok, stdout, stderr) = run(&["--no-config", "--check-config"]);
    assert!(ok, "stdout: '{}', stderr: '{}'", stdout, stderr);
    assert!(stdout.contains("Configuration is valid"));
}

#[test]
fn test_check_config_rejects_relative_telemetry_path() {
    let (ok, stdout, stderr) = run(&["--no-config", "--telemetry-path", "metrics", "--check-config"]);
    assert!(!ok);
    assert!(
        stderr.contains("must start with '/'") || stdout.contains("must start with '/'"),
        "Expected telemetry path error, got stdout: '{}', stderr: '{}'",
        stdout,
        stderr
    );
}

#[test]
fn test_tls_enabled_without_paths() {
    let (ok, stdout, stderr) = run(&["--no-config", "--enable-tls", "--check-config"]);
    assert!(!ok);
    assert!(
        stdout.contains("TLS is enabled but neither tls_cert_path nor tls_key_path are set")
            || stderr.contains("TLS is enabled but neither tls_cert_path nor tls_key_path are set"),
        "Expected error about missing TLS paths, got stdout: '{}', stderr: '{}'",
        stdout,
        stderr
    );
}

#[test]
fn test_tls_enabled_with_missing_cert_file() {
    let (ok, stdout, stderr) = run(&[
        "--no-config",
        "--enable-tls",
        "--tls-cert",
        "/nonexistent/cert.pem",
        "--tls-key",
        "/nonexistent/key.pem",
        "--check-config",
    ]);
    assert!(!ok);
    assert!(
        stdout.contains("TLS certificate file not found")
            || stderr.contains("TLS certificate file not found"),
        "Expected missing certificate error, got stdout: '{}', stderr: '{}'",
        stdout,
        stderr
    );
}

#[test]
fn test_show_config_json_uses_cli_overrides() {
    let (ok, stdout, _) = run(&[
        "--no-config",
        "--hindsight",
        "/var/lib/hindsight/hindsight.tsv",
        "--web.telemetry-path",
        "/stats",
        "--show-config",
        "--config-format",
        "json",
    ]);
    assert!(ok);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["hindsight_path"], "/var/lib/hindsight/hindsight.tsv");
    assert_eq!(value["telemetry_path"], "/stats");
    assert_eq!(value["port"], 9121);
}

#[test]
fn test_config_file_is_loaded() {
    let mut file = NamedTempFile::with_suffix(".yaml").expect("Failed to create temp file");
    writeln!(file, "port: 9500\nhindsight_path: /tmp/hindsight.tsv").unwrap();

    let (ok, stdout, _) = run(&[
        "--config",
        file.path().to_str().unwrap(),
        "--show-config",
        "--config-format",
        "json",
    ]);
    assert!(ok);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["port"], 9500);
    assert_eq!(value["hindsight_path"], "/tmp/hindsight.tsv");
    assert_eq!(value["telemetry_path"], "/metrics");
}

#[test]
fn test_test_command_scrapes_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "header\npluginA 10 20 5 0\npluginB 3 8 1 1\n").unwrap();

    let (ok, stdout, stderr) = run(&[
        "--no-config",
        "--log-level",
        "off",
        "--hindsight",
        file.path().to_str().unwrap(),
        "test",
        "--verbose",
    ]);
    assert!(ok, "stdout: '{}', stderr: '{}'", stdout, stderr);
    assert!(stdout.contains("Observations: 8"));
    assert!(stdout.contains("hindsight_injected_message_count{plugin=\"pluginA\"} 10"));
}

#[test]
fn test_catalog_command_lists_metrics() {
    let (ok, stdout, _) = run(&["catalog"]);
    assert!(ok);
    assert!(stdout.contains("hindsight_injected_message_count"));
    assert!(stdout.contains("hindsight_process_message_failures"));
    assert!(stdout.contains("4 metrics"));
}

#[test]
fn test_listen_address_sets_bind_and_port() {
    let (ok, stdout, stderr) = run(&[
        "--no-config",
        "--web.listen-address",
        "127.0.0.1:9300",
        "--show-config",
        "--config-format",
        "json",
    ]);
    assert!(ok, "stdout: '{}', stderr: '{}'", stdout, stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(value["bind"], "127.0.0.1");
    assert_eq!(value["port"], 9300);
}

#[test]
fn test_listen_address_port_only_keeps_bind() {
    let (ok, stdout, stderr) = run(&[
        "--no-config",
        "--web.listen-address",
        ":9400",
        "--show-config",
        "--config-format",
        "json",
    ]);
    assert!(ok, "stdout: '{}', stderr: '{}'", stdout, stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(value["bind"], "0.0.0.0");
    assert_eq!(value["port"], 9400);
}

#[test]
fn test_listen_address_rejects_hostname() {
    let (ok, _, stderr) = run(&[
        "--no-config",
        "--web.listen-address",
        "localhost:9121",
        "--check-config",
    ]);
    assert!(!ok);
    assert!(stderr.contains("invalid IP"), "stderr: '{}'", stderr);
}

#[test]
fn test_check_config_accepts_ipv6_bind() {
    let (ok, stdout, stderr) = run(&["--no-config", "--bind", "::1", "--check-config"]);
    assert!(ok, "stdout: '{}', stderr: '{}'", stdout, stderr);
}

#[test]
fn test_check_config_rejects_hostname_bind_from_file() {
    let mut file = NamedTempFile::with_suffix(".yaml").expect("Failed to create temp file");
    writeln!(file, "bind: localhost").unwrap();

    let path = file.path().to_str().unwrap();
    let (ok, _, stderr) = run(&["--config", path, "--check-config"]);
    assert!(!ok);
    assert!(stderr.contains("is not an IP address"), "stderr: '{}'", stderr);
}

#[test]
fn test_test_command_reports_invalid_config() {
    let (ok, _, stderr) = run(&["--no-config", "--telemetry-path", "metrics", "test"]);
    assert!(!ok);
    assert!(stderr.contains("Configuration invalid"), "stderr: '{}'", stderr);
    assert!(stderr.contains("must start with '/'"), "stderr: '{}'", stderr);
}
