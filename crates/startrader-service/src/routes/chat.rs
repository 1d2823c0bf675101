//! Chat relay endpoint

use axum::extract::State;
use axum::response::Json;
use tracing::info;

use crate::error::AppError;
use crate::server::SharedState;
use crate::types::{ChatMessage, ChatRequest};

/// Relay a conversation to the model, with the tool catalogue available
pub async fn chat(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let relay = state.chat.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Chat is not configured".to_string())
    })?;

    if request.messages.is_empty() {
        return Err(AppError::BadRequest("messages must not be empty".to_string()));
    }

    info!(messages = request.messages.len(), "Relaying chat request");
    let reply = relay
        .respond(&state.registry, request.messages)
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    Ok(Json(reply))
}
