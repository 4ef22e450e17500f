//! # tutorhub-gemini
//!
//! Thin client for the Google Generative Language REST API, covering
//! the two calls TutorHub makes: tutoring chat (text, optionally with
//! an inline image) and multiple-choice quiz generation.
//!
//! The presence core knows nothing about this crate; it is a
//! collaborator reached from the HTTP handlers only.

pub mod client;
pub mod quiz;
pub mod types;

pub use client::GeminiClient;
pub use quiz::QuizQuestion;
pub use types::{Content, Part};
