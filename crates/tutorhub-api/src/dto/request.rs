//! Request DTOs.

use serde::{Deserialize, Serialize};

use tutorhub_gemini::Content;

/// Body of `POST /web/chat/{sessionId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The student's message.
    #[serde(default)]
    pub message: Option<String>,
    /// Prior conversation turns in API format.
    #[serde(default)]
    pub history: Vec<Content>,
    /// Optional base64 PNG, with or without a data-URL prefix.
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of `POST /web/generate-quiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    /// Quiz topic.
    pub topic: String,
    /// Reference concepts to draw questions from.
    pub concepts: String,
    /// How many questions to generate.
    #[serde(default = "default_question_count")]
    pub number_of_questions: usize,
}

fn default_question_count() -> usize {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_request_default_count() {
        let req: QuizRequest =
            serde_json::from_str(r#"{"topic":"algebra","concepts":"factoring"}"#).unwrap();
        assert_eq!(req.number_of_questions, 15);
    }

    #[test]
    fn test_chat_request_all_fields_optional_but_parseable() {
        let req: ChatRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.message.is_none());
        assert!(req.history.is_empty());
        assert!(req.image.is_none());
    }
}
