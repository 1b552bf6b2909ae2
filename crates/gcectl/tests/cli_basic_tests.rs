use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test command
fn gcectl() -> Command {
    let mut cmd = Command::cargo_bin("gcectl").unwrap();
    cmd.env_remove("GCECTL_PROFILE")
        .env_remove("GCECTL_CONFIG_FILE")
        .env_remove("GCECTL_PROJECT")
        .env_remove("GCECTL_ACCESS_TOKEN")
        .env_remove("GCECTL_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper running against an isolated config file
fn gcectl_with_config(config: &Path) -> Command {
    let mut cmd = gcectl();
    cmd.arg("--config-file").arg(config);
    cmd
}

/// Write a config with one default profile pointed at `api_url`
fn write_profile(dir: &TempDir, api_url: &str) -> std::path::PathBuf {
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!(
            r#"default_profile = "test"

[profiles.test]
project = "my-project"
access_token = "test-token"
api_url = "{api_url}"

[profiles.test.polling]
interval_ms = 10
timeout_ms = 5000
"#
        ),
    )
    .unwrap();
    config
}

const OP_PATH: &str = "/compute/v1/projects/my-project/zones/us-central1-a/operations/op-1";

fn zonal_operation(status: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "op-1",
        "status": status,
        "operationType": "insert",
        "zone": "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a",
        "targetLink": "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a/instances/vm-1"
    })
}

#[test]
fn test_help_flag() {
    gcectl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Compute Engine CLI that waits on long-running operations",
        ))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    gcectl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gcectl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_json() {
    gcectl()
        .args(["version", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"gcectl\""));
}

#[test]
fn test_no_args_shows_help() {
    gcectl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    gcectl()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_operation_wait_help() {
    gcectl()
        .args(["operation", "wait", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--zone"))
        .stdout(predicate::str::contains("--region"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn test_zone_and_region_conflict() {
    gcectl()
        .args([
            "operation",
            "get",
            "op-1",
            "--zone",
            "us-central1-a",
            "--region",
            "us-central1",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_profile_lifecycle() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    gcectl_with_config(&config)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured."));

    gcectl_with_config(&config)
        .args([
            "profile",
            "set",
            "dev",
            "--project",
            "dev-project",
            "--access-token",
            "ya29.secret-token",
            "--interval-ms",
            "500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'dev' saved"))
        .stdout(predicate::str::contains("'dev' is the default profile"));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("dev-project"));
    assert!(saved.contains("interval_ms = 500"));

    gcectl_with_config(&config)
        .args(["profile", "show", "dev", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"project\": \"dev-project\""))
        .stdout(predicate::str::contains("\"is_default\": true"))
        .stdout(predicate::str::contains("secret-token").not());

    gcectl_with_config(&config)
        .args(["profile", "remove", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'dev' removed"));

    gcectl_with_config(&config)
        .args(["profile", "show", "dev"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'dev' not found"));
}

#[test]
fn test_profile_set_rejects_zero_interval() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    gcectl_with_config(&config)
        .args([
            "profile",
            "set",
            "dev",
            "--project",
            "dev-project",
            "--interval-ms",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
    assert!(!config.exists());
}

#[test]
fn test_operation_without_profile_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    gcectl_with_config(&config)
        .args(["operation", "get", "op-1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No profile selected"));
}

#[test]
fn test_resource_create_missing_body_file() {
    let dir = TempDir::new().unwrap();
    let config = write_profile(&dir, "http://127.0.0.1:9/compute/v1");

    gcectl_with_config(&config)
        .args([
            "resource",
            "create",
            "firewall",
            "allow-ssh",
            "--body",
            "/nonexistent/firewall.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/firewall.json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_operation_wait_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OP_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zonal_operation("RUNNING")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(OP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(zonal_operation("DONE")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_profile(&dir, &format!("{}/compute/v1", server.uri()));

    let assert = tokio::task::spawn_blocking(move || {
        gcectl_with_config(&config)
            .args([
                "operation",
                "wait",
                "op-1",
                "--zone",
                "us-central1-a",
                "-o",
                "json",
            ])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("\"result\": \"success\""))
        .stdout(predicate::str::contains("\"status\": \"DONE\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_operation_wait_reports_failure() {
    let server = MockServer::start().await;
    let mut failed = zonal_operation("DONE");
    failed["error"] = serde_json::json!({
        "errors": [{ "code": "QUOTA_EXCEEDED", "message": "Quota 'CPUS' exceeded." }]
    });
    failed["httpErrorStatusCode"] = serde_json::json!(403);
    Mock::given(method("GET"))
        .and(path(OP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(failed))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_profile(&dir, &format!("{}/compute/v1", server.uri()));

    let assert = tokio::task::spawn_blocking(move || {
        gcectl_with_config(&config)
            .args(["operation", "wait", "op-1", "--zone", "us-central1-a"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Quota 'CPUS' exceeded."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_operation_wait_vanished_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OP_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": 404, "message": "The resource 'op-1' was not found" }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_profile(&dir, &format!("{}/compute/v1", server.uri()));

    let assert = tokio::task::spawn_blocking(move || {
        gcectl_with_config(&config)
            .args([
                "operation",
                "wait",
                "op-1",
                "--zone",
                "us-central1-a",
                "-o",
                "json",
            ])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("\"result\": \"unknown\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_operation_wait_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(zonal_operation("RUNNING")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_profile(&dir, &format!("{}/compute/v1", server.uri()));

    let assert = tokio::task::spawn_blocking(move || {
        gcectl_with_config(&config)
            .args([
                "operation",
                "wait",
                "op-1",
                "--zone",
                "us-central1-a",
                "--timeout",
                "50",
                "--interval",
                "10",
            ])
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .code(1)
        .stderr(predicate::str::contains("operation not DONE after 50 ms"));
}
