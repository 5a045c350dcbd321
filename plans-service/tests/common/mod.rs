#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use plans_service::models::CarrierPlans;
use plans_service::services::providers::mock::ScriptedTextProvider;
use plans_service::services::{InMemoryChatStore, LocalStorage, PlanCatalog};
use plans_service::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const ROOT_PREFIX: &str = "processados/";

pub const AURORA: &str = "Aurora Saúde";
pub const SINDINAPI: &str = "SINDINAPI";

/// Router wired to in-process collaborators: storage on a temp directory,
/// an in-memory document store and a scripted model.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryChatStore>,
    pub provider: Arc<ScriptedTextProvider>,
    _storage_dir: TempDir,
}

impl TestApp {
    pub async fn spawn(
        files: &[(&str, &str)],
        store: InMemoryChatStore,
        provider: ScriptedTextProvider,
    ) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create storage dir");
        for (key, content) in files {
            let path = dir.path().join(key);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        let storage = LocalStorage::new(dir.path())
            .await
            .expect("Failed to open local storage");
        let catalog = PlanCatalog::new(Arc::new(storage), ROOT_PREFIX);

        let store = Arc::new(store);
        let provider = Arc::new(provider);
        let state = AppState::new(catalog, store.clone(), provider.clone());

        TestApp {
            router: build_router(state),
            store,
            provider,
            _storage_dir: dir,
        }
    }

    /// Storage-only app; the assistant has nothing scripted.
    pub async fn with_files(files: &[(&str, &str)]) -> Self {
        Self::spawn(
            files,
            InMemoryChatStore::default(),
            ScriptedTextProvider::default(),
        )
        .await
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.get(uri).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let response = self.get(uri).await;
        let status = response.status();
        (status, body_text(response).await)
    }

    pub async fn post_chat(&self, body: &str) -> (StatusCode, Value) {
        let response = self
            .request(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("Response body is not JSON")
}

/// Plan document as produced by the extraction pipeline.
pub fn aurora_document() -> Value {
    json!({
        "empresa": AURORA,
        "planos": [
            {
                "produto": "A200 AMB. + HOSP. ENFERMARIA",
                "acomodacao": "Enfermaria",
                "acomodacao_preco": {
                    "enfermaria": [
                        { "19-23": 153.15, "00-18": 127.62, "59+": "759,69" }
                    ]
                },
                "coparticipacao": true
            },
            {
                "produto": "A100 AMBULATORIAL",
                "acomodacao": "N/A",
                "acomodacao_preco": {}
            }
        ]
    })
}

pub fn aurora_plans() -> CarrierPlans {
    serde_json::from_value(aurora_document()).unwrap()
}

pub fn catalog_labels() -> Vec<String> {
    vec![AURORA.to_string(), SINDINAPI.to_string()]
}

pub fn chat_store() -> InMemoryChatStore {
    InMemoryChatStore::new(catalog_labels(), vec![aurora_plans()])
}
