//! Quiz prompt construction and model-output parsing.

use serde::{Deserialize, Serialize};

use tutorhub_core::error::AppError;

/// One generated multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// The question text.
    pub question: String,
    /// Four answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
    /// Why that answer is correct.
    pub explanation: String,
}

/// Builds the quiz-generation prompt.
pub fn build_prompt(topic: &str, concepts: &str, count: usize) -> String {
    format!(
        "Generate {count} multiple-choice quiz questions about {topic}.\n\
         Use these concepts as reference: {concepts}\n\
         \n\
         Each question should:\n\
         1. Be clear and concise\n\
         2. Have 4 options (A, B, C, D)\n\
         3. Include one correct answer\n\
         4. Include a brief explanation of why the answer is correct\n\
         \n\
         Format each question as a JSON object with these fields:\n\
         - question: The question text\n\
         - options: Array of 4 possible answers\n\
         - correctAnswer: The correct answer\n\
         - explanation: Why this answer is correct\n\
         \n\
         Return an array of these question objects."
    )
}

/// Parses the model reply into questions, truncated to `limit`.
///
/// Model output arrives either inside a ```` ```json ```` fence, a bare
/// code fence, or as a naked JSON array; all three are handled.
pub fn extract_questions(reply: &str, limit: usize) -> Result<Vec<QuizQuestion>, AppError> {
    let json = extract_json_payload(reply);
    let mut questions: Vec<QuizQuestion> = serde_json::from_str(json.trim())
        .map_err(|e| AppError::serialization(format!("failed to parse quiz questions: {e}")))?;
    questions.truncate(limit);
    Ok(questions)
}

/// Locates the JSON payload within a model reply.
fn extract_json_payload(reply: &str) -> &str {
    for fence in ["```json", "```"] {
        if let Some(start) = reply.find(fence) {
            let body = &reply[start + fence.len()..];
            if let Some(end) = body.find("```") {
                return &body[..end];
            }
        }
    }
    match (reply.find('['), reply.rfind(']')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTIONS: &str = r#"[
        {"question":"2+2?","options":["1","2","3","4"],"correctAnswer":"4","explanation":"Addition."},
        {"question":"3*3?","options":["6","9","12","3"],"correctAnswer":"9","explanation":"Multiplication."}
    ]"#;

    #[test]
    fn test_extract_from_json_fence() {
        let reply = format!("Here you go:\n```json\n{QUESTIONS}\n```\nEnjoy!");
        let questions = extract_questions(&reply, 10).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, "4");
    }

    #[test]
    fn test_extract_from_plain_fence() {
        let reply = format!("```\n{QUESTIONS}\n```");
        assert_eq!(extract_questions(&reply, 10).unwrap().len(), 2);
    }

    #[test]
    fn test_extract_bare_array() {
        let reply = format!("Sure! {QUESTIONS} Hope that helps.");
        assert_eq!(extract_questions(&reply, 10).unwrap().len(), 2);
    }

    #[test]
    fn test_truncates_to_requested_count() {
        let questions = extract_questions(QUESTIONS, 1).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "2+2?");
    }

    #[test]
    fn test_unparseable_reply_is_an_error() {
        assert!(extract_questions("I cannot do that.", 5).is_err());
    }
}
