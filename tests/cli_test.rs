#![allow(deprecated)]

/// End-to-end tests for the servicekit binary
///
/// These tests validate argument parsing, configuration validation and
/// error reporting, plus one Protecode call against a local mock server.
use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
mod common;

fn servicekit() -> Command {
    let mut cmd = Command::cargo_bin("servicekit").unwrap();
    cmd.env_remove("SERVICEKIT_PROTECODE_URL")
        .env_remove("SERVICEKIT_ANS_SERVICE_KEY")
        .env_remove("SERVICEKIT_ANS_SERVICE_KEY_PATH")
        .env_remove("SERVICEKIT_TIMEOUT_SECONDS");
    cmd
}

/// Test 1: Help lists the top-level commands
#[test]
fn test_help_lists_commands() {
    servicekit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("token"))
        .stdout(predicate::str::contains("ans"))
        .stdout(predicate::str::contains("protecode"));
}

/// Test 2: Zero timeout in the config file is rejected
#[test]
fn test_invalid_config_timeout_zero() {
    let (_temp_dir, config_path) = common::temp_config_file("http:\n  timeout_seconds: 0\n");

    servicekit()
        .arg("--config")
        .arg(config_path)
        .args(["protecode", "delete", "--id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be greater than 0"));
}

/// Test 3: Non-http Protecode URL is rejected
#[test]
fn test_invalid_config_protecode_scheme() {
    let (_temp_dir, config_path) =
        common::temp_config_file("protecode:\n  server_url: ftp://protecode.example.com\n");

    servicekit()
        .arg("--config")
        .arg(config_path)
        .args(["protecode", "result", "--id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must use http or https"));
}

/// Test 4: A malformed service key is reported before any request
#[test]
fn test_ans_send_bad_service_key() {
    let (temp_dir, config_path) = common::temp_config_file("http:\n  timeout_seconds: 5\n");
    let key_path = common::temp_file(&temp_dir, "key.json", "{not json");
    let event_path = common::temp_file(&temp_dir, "event.json", "{}");

    servicekit()
        .arg("--config")
        .arg(config_path)
        .args(["ans", "send", "--event"])
        .arg(event_path)
        .arg("--service-key")
        .arg(key_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error unmarshalling ANS serviceKey"));
}

/// Test 5: Delete against a mock Protecode server
#[tokio::test]
async fn test_protecode_delete_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/product/7/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (temp_dir, config_path) = common::temp_config_file(&format!(
        "protecode:\n  server_url: {}\n  username: user\n  password: secret\n",
        server.uri()
    ));

    // The mock server needs the runtime while the binary runs.
    let output = tokio::task::spawn_blocking(move || {
        let _keep = temp_dir;
        servicekit()
            .arg("--config")
            .arg(config_path)
            .args(["protecode", "delete", "--id", "7"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted product 7"));
}
