//! Generative language API configuration.

use serde::{Deserialize, Serialize};

/// Google Generative Language API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. Usually supplied via `TUTORHUB__GEMINI__API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for chat (supports inline images).
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model used for quiz generation.
    #[serde(default = "default_quiz_model")]
    pub quiz_model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// Generation parameters sent with every request.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Model sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Nucleus sampling probability mass.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Top-k sampling cutoff.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Maximum tokens in the model reply.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            quiz_model: default_quiz_model(),
            request_timeout_seconds: default_timeout(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_chat_model() -> String {
    "gemini-1.5-pro-latest".to_string()
}

fn default_quiz_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_temperature() -> f64 {
    1.0
}

fn default_top_p() -> f64 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8192
}
