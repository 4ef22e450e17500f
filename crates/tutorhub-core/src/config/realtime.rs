//! Presence engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Heartbeat probe sweep interval in seconds. A connection that fails
    /// to answer one full sweep interval is evicted.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Periodic session-count refresh interval in seconds.
    #[serde(default = "default_broadcast_interval")]
    pub broadcast_interval_seconds: u64,
    /// Per-connection outbound frame queue capacity.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue_capacity: usize,
}

impl RealtimeConfig {
    /// Heartbeat sweep interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    /// Periodic refresh interval as a [`Duration`].
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.broadcast_interval_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            broadcast_interval_seconds: default_broadcast_interval(),
            outbound_queue_capacity: default_outbound_queue(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_broadcast_interval() -> u64 {
    5
}

fn default_outbound_queue() -> usize {
    256
}
