use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

pub const CARRIER_REQUIRED: &str = "Nome da operadora é obrigatório";
pub const FETCH_PLANS_ERROR: &str = "Falha ao buscar os detalhes do plano no servidor.";

/// `GET /api/planos/:operadora`, also mounted at the legacy `/api/:operadora`.
///
/// Answers `null` with 200 when the carrier has no data file.
pub async fn get_plan_document(
    State(state): State<AppState>,
    Path(operadora): Path<String>,
) -> Result<Json<Option<Value>>, AppError> {
    let carrier = operadora.trim();
    if carrier.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(CARRIER_REQUIRED)));
    }

    let document = state
        .catalog
        .fetch_plan_document(carrier)
        .await
        .map_err(|e| e.masked(FETCH_PLANS_ERROR))?;

    Ok(Json(document))
}

/// `GET /api/planos` and `GET /api/planos/`: the carrier segment is missing.
pub async fn missing_carrier() -> AppError {
    AppError::BadRequest(anyhow::anyhow!(CARRIER_REQUIRED))
}
