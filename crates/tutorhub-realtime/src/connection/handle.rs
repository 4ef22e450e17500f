//! Individual connection handle.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique connection identifier, generated at accept time.
pub type ConnectionId = Uuid;

/// Frame pushed onto a connection's outbound queue.
///
/// The engine never touches the socket directly; the transport layer
/// drains the queue and maps frames onto WebSocket frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A JSON text payload.
    Text(String),
    /// A liveness probe (WebSocket ping).
    Ping,
    /// Request that the transport close the socket.
    Close,
}

/// Connection lifecycle state. `Closed` is terminal and irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Transport handshake in progress.
    Connecting = 0,
    /// Fully established; the only state that accepts payloads.
    Open = 1,
    /// Close requested, transport teardown pending.
    Closing = 2,
    /// Gone. No further transitions.
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Diagnostic metadata about the remote peer. Informational only.
#[derive(Debug, Clone, Default)]
pub struct RemoteInfo {
    /// Peer socket address, when the transport knows it.
    pub peer_addr: Option<SocketAddr>,
    /// Negotiated WebSocket subprotocol, if any.
    pub subprotocol: Option<String>,
}

/// A handle to a single live connection.
///
/// Owned by the connection registry; every other component sees only
/// the [`ConnectionId`]. Holds the bounded sender for outbound frames
/// plus the liveness flag driven by the heartbeat sweep.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Remote peer metadata.
    pub remote: RemoteInfo,
    /// When the connection was accepted.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<Frame>,
    state: AtomicU8,
    liveness: AtomicBool,
}

impl ConnectionHandle {
    /// Creates a handle in the `Connecting` state with liveness set.
    pub fn new(remote: RemoteInfo, sender: mpsc::Sender<Frame>) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote,
            connected_at: Utc::now(),
            sender,
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            liveness: AtomicBool::new(true),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Transitions to `next`. A `Closed` connection stays closed.
    pub fn set_state(&self, next: ConnectionState) {
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if current == ConnectionState::Closed as u8 {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }

    /// Whether the connection accepts payloads.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Whether the connection answered since the last probe sweep.
    pub fn is_alive(&self) -> bool {
        self.liveness.load(Ordering::SeqCst)
    }

    /// Records a probe reply.
    pub fn mark_alive(&self) {
        self.liveness.store(true, Ordering::SeqCst);
    }

    /// Clears the liveness flag at the start of a probe sweep.
    pub fn clear_liveness(&self) {
        self.liveness.store(false, Ordering::SeqCst);
    }

    /// Queues a frame for delivery if the connection is `Open`.
    ///
    /// Never blocks: a full queue drops the frame (the slow peer will be
    /// caught up by the periodic refresh), a closed queue marks the
    /// connection closed. Returns whether the frame was queued.
    pub fn send(&self, frame: Frame) -> bool {
        if !self.is_open() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "outbound queue full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.set_state(ConnectionState::Closed);
                false
            }
        }
    }

    /// Asks the transport to tear the socket down.
    ///
    /// Bypasses the `Open` check so a `Closing` connection can still get
    /// its close frame out.
    pub fn close(&self) {
        self.set_state(ConnectionState::Closing);
        let _ = self.sender.try_send(Frame::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (ConnectionHandle, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(4);
        (ConnectionHandle::new(RemoteInfo::default(), tx), rx)
    }

    #[test]
    fn test_closed_is_terminal() {
        let (h, _rx) = handle();
        h.set_state(ConnectionState::Open);
        h.set_state(ConnectionState::Closed);
        h.set_state(ConnectionState::Open);
        assert_eq!(h.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_send_requires_open() {
        let (h, mut rx) = handle();
        assert!(!h.send(Frame::Ping), "Connecting state must not send");
        h.set_state(ConnectionState::Open);
        assert!(h.send(Frame::Ping));
        assert_eq!(rx.try_recv().ok(), Some(Frame::Ping));
    }

    #[test]
    fn test_full_queue_drops_frame() {
        let (tx, _rx) = mpsc::channel(1);
        let h = ConnectionHandle::new(RemoteInfo::default(), tx);
        h.set_state(ConnectionState::Open);
        assert!(h.send(Frame::Text("a".into())));
        assert!(!h.send(Frame::Text("b".into())));
        assert!(h.is_open(), "a full queue is not a dead connection");
    }

    #[test]
    fn test_closed_queue_closes_connection() {
        let (tx, rx) = mpsc::channel(1);
        let h = ConnectionHandle::new(RemoteInfo::default(), tx);
        h.set_state(ConnectionState::Open);
        drop(rx);
        assert!(!h.send(Frame::Ping));
        assert_eq!(h.state(), ConnectionState::Closed);
    }
}
