use crate::models::Carrier;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

pub const LIST_CARRIERS_ERROR: &str = "Falha ao buscar dados no S3";

/// `GET /api/operadoras`
pub async fn list_carriers(State(state): State<AppState>) -> Result<Json<Vec<Carrier>>, AppError> {
    let carriers = state
        .catalog
        .list_carriers()
        .await
        .map_err(|e| e.masked(LIST_CARRIERS_ERROR))?;

    tracing::debug!(count = carriers.len(), "Listed carriers");
    Ok(Json(carriers))
}
