//! Quiz generation handler.

use axum::Json;
use axum::extract::State;
use tracing::info;

use crate::dto::request::QuizRequest;
use crate::dto::response::QuizResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /web/generate-quiz
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(body): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    info!(
        topic = %body.topic,
        count = body.number_of_questions,
        "quiz generation request"
    );

    let questions = state
        .gemini
        .generate_quiz(&body.topic, &body.concepts, body.number_of_questions)
        .await?;

    Ok(Json(QuizResponse {
        status: "success".to_string(),
        questions,
    }))
}
