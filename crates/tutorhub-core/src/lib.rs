//! # tutorhub-core
//!
//! Shared foundation for the TutorHub presence server:
//!
//! - Configuration schemas loaded from TOML + environment
//! - Unified [`error::AppError`] propagated through every crate

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
