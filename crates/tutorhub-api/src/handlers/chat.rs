//! Tutoring chat handler.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use tutorhub_core::error::AppError;

use crate::dto::request::ChatRequest;
use crate::dto::response::ChatResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /web/chat/{sessionId}
pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.unwrap_or_default();
    if message.is_empty() && body.image.is_none() {
        return Err(AppError::validation("message or image is required").into());
    }

    info!(
        session_id = %session_id,
        has_image = body.image.is_some(),
        history_len = body.history.len(),
        "chat request"
    );

    let reply = state
        .gemini
        .chat(&message, body.history.clone(), body.image.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        status: "success".to_string(),
        message: reply,
        session_id,
        history: body.history,
    }))
}
