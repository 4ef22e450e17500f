//! # tutorhub-api
//!
//! Axum surface for TutorHub: the `/ws` presence endpoint, health
//! inspection routes, and the `/web` tutoring routes (session
//! creation, chat, quiz generation).

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
