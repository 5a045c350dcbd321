//! Application startup and lifecycle management.

use crate::config::{PlansConfig, StorageBackend, StorageConfig};
use crate::handlers::{
    carriers::list_carriers,
    chat::chat,
    health::{health_check, readiness_check},
    metrics::metrics,
    pages::index,
    plans::{get_plan_document, missing_carrier},
};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::{Assistant, ChatStore, LocalStorage, PlanCatalog, PlansDb, S3Storage, Storage};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id, request_id_middleware},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: PlanCatalog,
    pub store: Arc<dyn ChatStore>,
    pub assistant: Assistant,
}

impl AppState {
    pub fn new(
        catalog: PlanCatalog,
        store: Arc<dyn ChatStore>,
        text_provider: Arc<dyn TextProvider>,
    ) -> Self {
        let assistant = Assistant::new(store.clone(), text_provider);
        Self {
            catalog,
            store,
            assistant,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/api/operadoras", get(list_carriers))
        .route("/api/planos", get(missing_carrier))
        .route("/api/planos/", get(missing_carrier))
        .route("/api/planos/:operadora", get(get_plan_document))
        .route("/api/chat", post(chat))
        // Path the first version of the page fetched plan documents from.
        .route("/api/:operadora", get(get_plan_document))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %request_id(request),
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Builds every process-wide client and binds the listener.
    ///
    /// Fails fast on unreachable storage roots, database or model setup.
    pub async fn build(config: PlansConfig) -> Result<Self, AppError> {
        let storage = build_storage(&config.storage).await?;
        let catalog = PlanCatalog::new(storage, config.storage.root_prefix.clone());

        let db = PlansDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let gemini_config = GeminiConfig::new(
            config.google.api_key.clone(),
            config.models.text_model.clone(),
        );
        let gemini = GeminiTextProvider::new(gemini_config)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
        tracing::info!(model = %gemini.model(), "Initialized Gemini text provider");

        let state = AppState::new(catalog, Arc::new(db), Arc::new(gemini));

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("plans-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Port the server is listening on (useful with port 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves requests until `shutdown` resolves, then drains in-flight ones.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, AppError> {
    match config.backend {
        StorageBackend::S3 => {
            let bucket = config.s3_bucket.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("S3_BUCKET_NAME is required for S3 storage"))
            })?;

            let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
            let s3_config = aws_sdk_s3::config::Builder::from(&shared)
                .region(Region::new(config.s3_region.clone()))
                .build();
            let storage = S3Storage::new(aws_sdk_s3::Client::from_conf(s3_config), bucket);

            tracing::info!(
                bucket = %storage.bucket(),
                region = %config.s3_region,
                root_prefix = %config.root_prefix,
                "Using S3 storage"
            );
            Ok(Arc::new(storage))
        }
        StorageBackend::Local => {
            let storage = LocalStorage::new(&config.local_path).await?;
            tracing::info!(
                path = %config.local_path,
                root_prefix = %config.root_prefix,
                "Using local storage"
            );
            Ok(Arc::new(storage))
        }
    }
}
