//! Tutoring session creation.

use axum::Json;
use uuid::Uuid;

use crate::dto::response::CreateSessionResponse;

/// POST /web/createSession
///
/// Hands out an opaque session identifier for the tutoring chat. No
/// server-side state; the client threads it back through chat calls.
pub async fn create_session() -> Json<CreateSessionResponse> {
    Json(CreateSessionResponse {
        session_id: Uuid::new_v4(),
    })
}
