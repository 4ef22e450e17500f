//! Application state shared across all handlers.

use std::sync::Arc;

use tutorhub_core::config::AppConfig;
use tutorhub_gemini::GeminiClient;
use tutorhub_realtime::PresenceEngine;

/// Shared dependencies, passed to every handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Presence engine.
    pub engine: Arc<PresenceEngine>,
    /// Generative language API client.
    pub gemini: Arc<GeminiClient>,
}

impl AppState {
    /// Bundles the shared dependencies.
    pub fn new(config: Arc<AppConfig>, engine: Arc<PresenceEngine>, gemini: Arc<GeminiClient>) -> Self {
        Self {
            config,
            engine,
            gemini,
        }
    }
}
