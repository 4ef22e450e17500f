//! Request handlers.

pub mod chat;
pub mod health;
pub mod quiz;
pub mod session;
pub mod ws;
