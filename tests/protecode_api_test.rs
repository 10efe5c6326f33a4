//! Protecode API integration tests using wiremock
//!
//! Each call is checked for its method, path and headers, and failures for
//! the fixed operation description. No call is ever retried.

use std::time::Duration;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use servicekit::error::ServiceKitError;
use servicekit::protecode::{
    read_json, ProductList, Protecode, ProtecodeOptions, ResultData, ScanStatus,
};

const BASIC_USER_SECRET: &str = "Basic dXNlcjpzZWNyZXQ=";

fn client(server: &MockServer) -> Protecode {
    Protecode::from_options(&ProtecodeOptions {
        server_url: format!("{}/", server.uri()),
        username: "user".to_string(),
        password: "secret".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn result_body(status: &str) -> serde_json::Value {
    serde_json::json!({
        "meta": {"code": 200},
        "results": {
            "product_id": 4711,
            "status": status,
            "report_url": "https://protecode.example.com/products/4711/",
            "filename": "app.jar"
        }
    })
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_result() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/product/1/"))
        .and(header("authorization", BASIC_USER_SECRET))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_result(1).await.unwrap();
}

#[tokio::test]
async fn test_delete_result_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/product/1/"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).delete_result(1).await.unwrap_err();
    let message = err.to_string();

    assert!(message.starts_with("failed to delete result: "));
    assert!(message.contains(&format!("{}/api/product/1/", server.uri())));
    assert!(message.contains("400 Bad Request"));
    assert!(matches!(
        err.downcast_ref::<ServiceKitError>(),
        Some(ServiceKitError::Call { .. })
    ));
}

// ---------------------------------------------------------------------------
// Loading products and results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_product() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/apps/42/"))
        .and(header("acceptType", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": [
                {"product_id": 1, "name": "app.jar"},
                {"product_id": 2, "name": "lib.jar"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).load_product("42").await.unwrap();
    let list: ProductList = read_json(response).await.unwrap();

    assert_eq!(list.products.len(), 2);
    assert_eq!(list.products[1].name, "lib.jar");
}

#[tokio::test]
async fn test_load_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/product/4711/"))
        .and(header("acceptType", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_body("R")))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).load_result(4711).await.unwrap();
    let data: ResultData = read_json(response).await.unwrap();

    assert_eq!(data.results.product_id, 4711);
    assert_eq!(data.results.status, ScanStatus::Ready);
    assert!(data.results.status.is_final());
}

#[tokio::test]
async fn test_load_result_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/product/9/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).load_result(9).await.unwrap_err();
    assert!(err.to_string().starts_with("failed to load results: "));
}

#[tokio::test]
async fn test_load_result_as_pdf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/product/4711/pdf-report"))
        .and(header("Cache-Control", "no-cache, no-store, must-revalidate"))
        .and(header("Pragma", "no-cache"))
        .and(header("Outputfile", "report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .load_result_as_pdf(4711, "report.pdf")
        .await
        .unwrap();
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"%PDF-1.4");
}

// ---------------------------------------------------------------------------
// Triggering scans
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_trigger_with_fetch_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/fetch/"))
        .and(header("Content-Type", "application/json"))
        .and(header("Group", "42"))
        .and(header("Delete-Binary", "true"))
        .and(header("Url", "https://artifacts.example.com/app.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_body("B")))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .trigger_with_fetch_url("42", "https://artifacts.example.com/app.jar", true)
        .await
        .unwrap();
    let data: ResultData = read_json(response).await.unwrap();
    assert_eq!(data.results.status, ScanStatus::Busy);
}

#[tokio::test]
async fn test_trigger_with_file_upload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/upload/app.jar"))
        .and(header("Group", "42"))
        .and(header("Delete-Binary", "false"))
        .and(header("authorization", BASIC_USER_SECRET))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("binary-content"))
        .respond_with(ResponseTemplate::new(201).set_body_json(result_body("B")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("app.jar");
    std::fs::write(&file_path, "binary-content").unwrap();

    let response = client(&server)
        .trigger_with_file_upload("42", &file_path, "app.jar", false)
        .await
        .unwrap();
    let data: ResultData = read_json(response).await.unwrap();
    assert_eq!(data.results.filename, "app.jar");
}

#[tokio::test]
async fn test_trigger_with_file_upload_missing_file() {
    let server = MockServer::start().await;

    let err = client(&server)
        .trigger_with_file_upload("42", std::path::Path::new("/no/such/app.jar"), "app.jar", false)
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("failed to trigger scan with file upload: "));
    assert!(server.received_requests().await.unwrap().is_empty());
}
