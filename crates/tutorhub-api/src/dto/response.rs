//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tutorhub_gemini::{Content, QuizQuestion};
use tutorhub_realtime::metrics::MetricsSnapshot;

/// `POST /web/createSession` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    /// Fresh session identifier.
    pub session_id: Uuid,
}

/// `POST /web/chat/{sessionId}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// `"success"`.
    pub status: String,
    /// Model reply.
    pub message: String,
    /// Echoed session identifier.
    pub session_id: String,
    /// Echoed conversation history.
    pub history: Vec<Content>,
}

/// `POST /web/generate-quiz` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    /// `"success"`.
    pub status: String,
    /// Generated questions.
    pub questions: Vec<QuizQuestion>,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Current open WebSocket connections.
    pub connections: usize,
}

/// `GET /api/health/detailed` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `"ok"`.
    pub status: String,
    /// Current open WebSocket connections.
    pub connections: usize,
    /// User identities with at least one session.
    pub users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
