//! Compute client tests against a mock API server

use gcectl_core::{
    ComputeClient, ComputeError, Operation, OperationPoller, OperationScope, OperationStatus,
    PollSettings,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ComputeClient {
    ComputeClient::new(
        &format!("{}/compute/v1", server.uri()),
        "my-project",
        Some("test-token".to_string()),
    )
    .unwrap()
}

fn operation_json(name: &str, status: &str) -> serde_json::Value {
    json!({
        "kind": "compute#operation",
        "id": "4931217820543216789",
        "name": name,
        "operationType": "insert",
        "status": status,
        "progress": if status == "DONE" { 100 } else { 0 },
        "zone": "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a",
        "targetLink": "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a/instances/vm-1",
        "insertTime": "2024-05-01T10:00:00.000-07:00"
    })
}

#[tokio::test]
async fn test_get_zonal_operation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/compute/v1/projects/my-project/zones/us-central1-a/operations/op-1",
        ))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation_json("op-1", "RUNNING")))
        .expect(1)
        .mount(&server)
        .await;

    let operation = client(&server)
        .await
        .get_operation(&OperationScope::Zonal("us-central1-a".to_string()), "op-1")
        .await
        .unwrap();

    assert_eq!(operation.name.as_deref(), Some("op-1"));
    assert_eq!(operation.status, OperationStatus::Running);
    assert_eq!(operation.progress, Some(0));
    assert_eq!(
        operation.scope(),
        OperationScope::Zonal("us-central1-a".to_string())
    );
}

#[tokio::test]
async fn test_get_regional_and_global_operations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/compute/v1/projects/my-project/regions/us-central1/operations/op-r",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "op-r",
            "status": "DONE",
            "region": "https://www.googleapis.com/compute/v1/projects/my-project/regions/us-central1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/compute/v1/projects/my-project/global/operations/op-g"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "op-g",
            "status": "DONE"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let regional = client
        .get_operation(&OperationScope::Regional("us-central1".to_string()), "op-r")
        .await
        .unwrap();
    assert!(regional.is_done());

    let global = client
        .get_operation(&OperationScope::Global, "op-g")
        .await
        .unwrap();
    assert_eq!(global.scope(), OperationScope::Global);
}

#[tokio::test]
async fn test_not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "The resource 'projects/my-project/global/operations/op-x' was not found",
                "errors": [{"reason": "notFound", "domain": "global"}]
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .get_operation(&OperationScope::Global, "op-x")
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{err:?}");
    assert_eq!(
        err.to_string(),
        "Not found: The resource 'projects/my-project/global/operations/op-x' was not found"
    );
}

#[tokio::test]
async fn test_server_error_without_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream connect error"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .get_operation(&OperationScope::Global, "op-1")
        .await
        .unwrap_err();

    assert!(
        matches!(err, ComputeError::ServerError { status: 503, ref message } if message == "upstream connect error"),
        "{err:?}"
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_insert_posts_body_and_returns_operation() {
    let server = MockServer::start().await;
    let body = json!({"name": "allow-ssh", "network": "global/networks/default"});
    Mock::given(method("POST"))
        .and(path("/compute/v1/projects/my-project/global/firewalls"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "op-insert",
            "status": "PENDING",
            "operationType": "insert"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let operation = client(&server)
        .await
        .insert(&OperationScope::Global, "firewalls", &body)
        .await
        .unwrap();

    assert_eq!(operation.name.as_deref(), Some("op-insert"));
    assert_eq!(operation.status, OperationStatus::Pending);
}

#[tokio::test]
async fn test_poller_against_mock_server() {
    let server = MockServer::start().await;
    let op_path = "/compute/v1/projects/my-project/zones/us-central1-a/operations/op-1";
    Mock::given(method("GET"))
        .and(path(op_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation_json("op-1", "RUNNING")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(op_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation_json("op-1", "DONE")))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let operation: Operation =
        serde_json::from_value(operation_json("op-1", "PENDING")).unwrap();
    let settings =
        PollSettings::new(Duration::from_secs(10)).with_interval(Duration::from_millis(10));

    let completion = OperationPoller::new(&client, settings)
        .wait(operation)
        .await
        .unwrap();

    assert!(completion.is_success(), "{completion:?}");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_poller_reports_operation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/compute/v1/projects/my-project/global/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "op-1",
            "status": "DONE",
            "httpErrorStatusCode": 400,
            "httpErrorMessage": "BAD REQUEST",
            "error": {
                "errors": [
                    {"code": "QUOTA_EXCEEDED", "message": "Quota 'FIREWALLS' exceeded.  Limit: 100.0 globally."},
                    {"code": "INVALID_USAGE"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let settings =
        PollSettings::new(Duration::from_secs(10)).with_interval(Duration::from_millis(10));
    let completion = OperationPoller::new(&client, settings)
        .wait(Operation::new("op-1"))
        .await
        .unwrap();

    assert_eq!(
        completion.failure_message(),
        Some("Quota 'FIREWALLS' exceeded.  Limit: 100.0 globally.; INVALID_USAGE")
    );
}
