mod common;

use axum::http::StatusCode;
use common::{aurora_document, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn carrier_without_objects_returns_null() {
    let app = TestApp::with_files(&[]).await;

    let (status, body) = app.get_json("/api/planos/aurora_saude").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn single_data_file_is_returned_unchanged() {
    let document = aurora_document().to_string();
    let app = TestApp::with_files(&[("processados/aurora_saude/tabela_2024.json", &document)]).await;

    let (status, body) = app.get_json("/api/planos/aurora_saude").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, aurora_document());
    // Fields the page does not use survive.
    assert_eq!(body["planos"][0]["coparticipacao"], json!(true));
}

#[tokio::test]
async fn legacy_path_serves_the_same_document() {
    let document = aurora_document().to_string();
    let app = TestApp::with_files(&[("processados/aurora_saude/aurora_saude.json", &document)]).await;

    let (status, body) = app.get_json("/api/aurora_saude").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, aurora_document());
}

#[tokio::test]
async fn blank_carrier_is_a_bad_request() {
    let app = TestApp::with_files(&[]).await;

    let (status, body) = app.get_json("/api/planos/%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Nome da operadora é obrigatório" }));
}

#[tokio::test]
async fn unreadable_data_file_is_a_generic_server_error() {
    let app = TestApp::with_files(&[("processados/aurora_saude/tabela.json", "{ nao e json")]).await;

    let (status, body) = app.get_json("/api/planos/aurora_saude").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Falha ao buscar os detalhes do plano no servidor." })
    );
}

#[tokio::test]
async fn missing_carrier_segment_is_a_bad_request() {
    let app = TestApp::with_files(&[]).await;

    for uri in ["/api/planos", "/api/planos/"] {
        let (status, body) = app.get_json(uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body, json!({ "error": "Nome da operadora é obrigatório" }));
    }
}
