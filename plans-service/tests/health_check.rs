mod common;

use axum::http::StatusCode;
use common::TestApp;
use service_core::middleware::tracing::REQUEST_ID_HEADER;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::with_files(&[]).await;

    let (status, body) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "plans-service");
}

#[tokio::test]
async fn readiness_follows_the_document_store() {
    let app = TestApp::with_files(&[]).await;

    let response = app.get("/ready").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let app = TestApp::with_files(&[]).await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::with_files(&[]).await;

    let response = app.get("/api/operadoras").await;

    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(
        response.headers()["content-security-policy"],
        "default-src 'none'; frame-ancestors 'none'"
    );
}
