use crate::models::{ChatReply, ChatRequest};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;

pub const MESSAGE_REQUIRED: &str = "A mensagem é obrigatória";
pub const CHAT_ERROR: &str = "Ocorreu um erro ao processar a requisição.";

/// `POST /api/chat`
///
/// The body is parsed by hand so that malformed JSON gets the same 400 as a
/// missing message instead of axum's extractor rejection.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatReply>, AppError> {
    let request: ChatRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(message) = request.message() else {
        return Err(AppError::BadRequest(anyhow::anyhow!(MESSAGE_REQUIRED)));
    };

    let reply = state
        .assistant
        .reply(message)
        .await
        .map_err(|e| e.masked(CHAT_ERROR))?;

    Ok(Json(ChatReply { reply }))
}
