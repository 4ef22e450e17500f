//! HTTP client for the Generative Language API.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use tutorhub_core::config::gemini::GeminiConfig;
use tutorhub_core::error::{AppError, ErrorKind};

use crate::quiz::{self, QuizQuestion};
use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationParams, Part,
};

/// Prompt used when an image arrives without an accompanying message.
const DEFAULT_IMAGE_PROMPT: &str = "Please explain this mathematical expression.";

/// Client for chat and quiz generation calls.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Creates a client from the gemini config section.
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "failed to build HTTP client", e)
            })?;
        Ok(Self { http, config })
    }

    /// Sends a tutoring chat turn and returns the model reply.
    ///
    /// `history` is the prior conversation in API turn format; `image`
    /// is an optional base64 PNG, with or without a data-URL prefix.
    pub async fn chat(
        &self,
        message: &str,
        history: Vec<Content>,
        image: Option<&str>,
    ) -> Result<String, AppError> {
        let mut parts = Vec::new();
        if let Some(image) = image {
            parts.push(Part::inline_png(normalize_image_data(image)?));
            let text = if message.is_empty() {
                DEFAULT_IMAGE_PROMPT
            } else {
                message
            };
            parts.push(Part::text(text));
        } else {
            parts.push(Part::text(message));
        }

        let mut contents = history;
        contents.push(Content::user(parts));

        let request = GenerateContentRequest {
            contents,
            generation_config: Some(GenerationParams::from(&self.config.generation)),
        };

        self.generate(&self.config.chat_model, &request).await
    }

    /// Generates up to `count` multiple-choice questions about a topic.
    pub async fn generate_quiz(
        &self,
        topic: &str,
        concepts: &str,
        count: usize,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let prompt = quiz::build_prompt(topic, concepts, count);
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: None,
        };

        let reply = self.generate(&self.config.quiz_model, &request).await?;
        quiz::extract_questions(&reply, count)
    }

    /// One `generateContent` round trip, returning the first candidate's
    /// text.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, AppError> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);
        debug!(model = %model, turns = request.contents.len(), "generateContent request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "generative API request failed",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "generative API returned {status}: {body}"
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "failed to decode generative API response",
                e,
            )
        })?;

        parsed
            .first_text()
            .ok_or_else(|| AppError::external_service("generative API returned no candidates"))
    }
}

/// Strips a `data:image/...;base64,` prefix and validates the payload
/// decodes as base64.
fn normalize_image_data(raw: &str) -> Result<String, AppError> {
    let data = match raw.find(";base64,") {
        Some(at) if raw.starts_with("data:") => &raw[at + ";base64,".len()..],
        _ => raw,
    };
    BASE64
        .decode(data)
        .map_err(|e| AppError::with_source(ErrorKind::Validation, "invalid image data", e))?;
    Ok(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_data_url_prefix() {
        let encoded = BASE64.encode(b"png bytes");
        let raw = format!("data:image/png;base64,{encoded}");
        assert_eq!(normalize_image_data(&raw).unwrap(), encoded);
    }

    #[test]
    fn test_normalize_accepts_bare_base64() {
        let encoded = BASE64.encode(b"png bytes");
        assert_eq!(normalize_image_data(&encoded).unwrap(), encoded);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_image_data("data:image/png;base64,@@@").is_err());
    }
}
