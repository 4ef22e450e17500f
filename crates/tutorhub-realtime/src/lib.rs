//! # tutorhub-realtime
//!
//! Presence engine for TutorHub. Provides:
//!
//! - Connection registry with generated connection identifiers
//! - Session index mapping user identities to their live connections
//! - Heartbeat probe sweep that evicts unresponsive connections
//! - Session-count broadcast, event-triggered and on a periodic refresh
//! - Control-message routing (`register`, `getUpdates`)
//!
//! The engine is transport-agnostic: the WebSocket layer hands it a
//! bounded outbound queue per connection and maps [`connection::Frame`]s
//! onto socket frames.

pub mod broadcast;
pub mod connection;
pub mod engine;
pub mod heartbeat;
pub mod message;
pub mod metrics;

pub use connection::handle::{ConnectionHandle, ConnectionId, ConnectionState, Frame, RemoteInfo};
pub use engine::PresenceEngine;
pub use metrics::RealtimeMetrics;
