//! Presence engine counters, exposed through the health endpoints.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Monotonic counters for the presence engine.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    heartbeat_evictions: AtomicU64,
    frames_sent: AtomicU64,
    frames_dropped: AtomicU64,
    messages_rejected: AtomicU64,
    broadcasts: AtomicU64,
}

impl RealtimeMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn heartbeat_eviction(&self) {
        self.heartbeat_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_rejected(&self) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn broadcast_sent(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            heartbeat_evictions: self.heartbeat_evictions.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counter snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections accepted since startup.
    pub connections_opened: u64,
    /// Connections removed since startup.
    pub connections_closed: u64,
    /// Connections evicted by the heartbeat monitor.
    pub heartbeat_evictions: u64,
    /// Frames queued for delivery.
    pub frames_sent: u64,
    /// Frames dropped (full queue or dead connection).
    pub frames_dropped: u64,
    /// Inbound messages dropped as malformed or unknown.
    pub messages_rejected: u64,
    /// Session-count fan-outs performed.
    pub broadcasts: u64,
}
