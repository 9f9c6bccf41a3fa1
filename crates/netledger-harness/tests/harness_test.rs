/*
[INPUT]:  Mock ledger service
[OUTPUT]: Test results for the harness runner and report
[POS]:    Integration tests - harness flow
[UPDATE]: When harness sections or exit code rules change
*/

use std::time::Duration;

use netledger_harness::{HarnessConfig, run};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> HarnessConfig {
    HarnessConfig {
        endpoint: server.uri(),
        api_key: "harness-key".to_string(),
        timeout: Duration::from_secs(5),
        name_prefix: "Test".to_string(),
    }
}

#[tokio::test]
async fn test_failing_server_fails_every_check() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Internal server error"
        })))
        .mount(&server)
        .await;

    let report = assert_ok!(run(&config_for(&server)).await);

    // Checks that depend on created records are skipped.
    assert_eq!(report.outcomes().len(), 7);
    assert_eq!(report.passed(), 0);
    assert_eq!(report.exit_code(), 1);
    assert!(report.render().contains("[FAIL] health check"));
}

#[tokio::test]
async fn test_service_checks_pass_against_healthy_root() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "NetLedger",
            "Version": "1.0.0",
            "UptimeSeconds": 12,
            "UptimeFormatted": "00:00:12"
        })))
        .mount(&server)
        .await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = assert_ok!(run(&config_for(&server)).await);

    let service: Vec<_> = report
        .outcomes()
        .iter()
        .filter(|o| o.section == "Service")
        .collect();
    assert_eq!(service.len(), 2);
    assert!(service.iter().all(|o| o.passed));
    assert_eq!(report.passed(), 2);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_invalid_endpoint_is_an_error() {
    let config = HarnessConfig {
        endpoint: "ftp://ledger.example.com".to_string(),
        api_key: "key".to_string(),
        timeout: Duration::from_secs(1),
        name_prefix: "Test".to_string(),
    };
    assert!(run(&config).await.is_err());
}
