//! Presence engine — the single mutation authority over the connection
//! registry and session index.
//!
//! All registry/session mutations and count computations serialize
//! through one mutex; no method is async and the lock is never held
//! across an await point. Delivery snapshots are collected under the
//! lock and sent after it is released, through each connection's
//! bounded fire-and-forget queue, so a slow peer cannot stall anyone.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use tutorhub_core::config::realtime::RealtimeConfig;

use crate::connection::handle::{ConnectionHandle, ConnectionId, ConnectionState, Frame, RemoteInfo};
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

/// Registry and session maps, guarded together.
#[derive(Debug, Default)]
struct PresenceState {
    /// Connection ID → handle. Owns every live connection.
    connections: HashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// User identity → member connection IDs. Never empty sets.
    sessions: HashMap<String, HashSet<ConnectionId>>,
    /// Connection ID → owning user. Makes the at-most-one-session-set
    /// invariant structural and unregister O(1).
    owners: HashMap<ConnectionId, String>,
}

/// A session-count delivery computed under the lock.
#[derive(Debug)]
struct FanOut {
    user_id: String,
    count: usize,
    targets: Vec<Arc<ConnectionHandle>>,
}

/// Coordinates connections, sessions, heartbeat liveness, and
/// session-count broadcast.
#[derive(Debug)]
pub struct PresenceEngine {
    state: Mutex<PresenceState>,
    config: RealtimeConfig,
    metrics: RealtimeMetrics,
    shutdown_tx: watch::Sender<bool>,
}

impl PresenceEngine {
    /// Creates an empty engine.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(PresenceState::default()),
            config,
            metrics: RealtimeMetrics::new(),
            shutdown_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PresenceState> {
        // A poisoned lock means a panic mid-mutation; recovering the
        // guard keeps the service up and the next sweep self-heals.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Engine counters.
    pub fn metrics(&self) -> &RealtimeMetrics {
        &self.metrics
    }

    /// Receiver for the shutdown flag observed by the background loops.
    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    // ── Connection registry ──────────────────────────────────────

    /// Accepts a new transport connection.
    ///
    /// Stores the connection in `Open` state, sends the
    /// `{"type":"connection","status":"connected"}` greeting, and returns
    /// the handle plus the receiver the transport drains.
    pub fn accept(&self, remote: RemoteInfo) -> (Arc<ConnectionHandle>, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_queue_capacity);
        let handle = Arc::new(ConnectionHandle::new(remote, tx));
        handle.set_state(ConnectionState::Open);

        self.lock().connections.insert(handle.id, handle.clone());
        self.metrics.connection_opened();

        if handle.send(Frame::Text(OutboundMessage::connected().encode())) {
            self.metrics.frame_sent();
        }

        info!(
            conn_id = %handle.id,
            peer = ?handle.remote.peer_addr,
            "connection accepted"
        );

        (handle, rx)
    }

    /// Queues a payload for one connection.
    ///
    /// A stale or non-open identifier is a soft failure: the frame is
    /// skipped and the caller carries on.
    pub fn send_to(&self, conn_id: &ConnectionId, payload: String) -> bool {
        let handle = self.lock().connections.get(conn_id).cloned();
        match handle {
            Some(handle) => {
                let queued = handle.send(Frame::Text(payload));
                if queued {
                    self.metrics.frame_sent();
                } else {
                    self.metrics.frame_dropped();
                }
                queued
            }
            None => {
                debug!(conn_id = %conn_id, "send to unknown connection skipped");
                false
            }
        }
    }

    /// Close-event cleanup: removes the connection from the registry,
    /// scrubs its session membership, and notifies the remaining
    /// members of the new count. Idempotent.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let (removed, fan) = {
            let mut state = self.lock();
            let removed = state.connections.remove(conn_id);
            if let Some(handle) = &removed {
                handle.set_state(ConnectionState::Closed);
            }
            let fan = Self::unregister_locked(&mut state, conn_id);
            (removed.is_some(), fan)
        };

        if removed {
            self.metrics.connection_closed();
            info!(conn_id = %conn_id, "connection removed");
        }
        if let Some(fan) = fan {
            self.deliver(fan);
        }
    }

    /// Forcibly closes the transport, then removes the connection.
    /// Used by the heartbeat monitor.
    pub fn terminate(&self, conn_id: &ConnectionId) {
        let handle = self.lock().connections.get(conn_id).cloned();
        if let Some(handle) = handle {
            handle.close();
        }
        self.disconnect(conn_id);
    }

    /// Number of connections currently in `Open` state.
    pub fn open_connections(&self) -> usize {
        self.lock()
            .connections
            .values()
            .filter(|c| c.is_open())
            .count()
    }

    /// Number of user identities with at least one session.
    pub fn user_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Records a probe reply from a connection.
    pub fn mark_alive(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.lock().connections.get(conn_id) {
            handle.mark_alive();
        }
    }

    // ── Session index ────────────────────────────────────────────

    /// Registers a connection under a user identity and broadcasts the
    /// new count to that user's members.
    ///
    /// A connection already registered under another identity is moved;
    /// the previous identity's members are notified too.
    pub fn register(&self, user_id: &str, conn_id: &ConnectionId) {
        let fans = {
            let mut state = self.lock();
            if !state.connections.contains_key(conn_id) {
                warn!(conn_id = %conn_id, user_id = %user_id, "register from unknown connection");
                return;
            }

            let mut fans = Vec::new();
            let previous = state.owners.get(conn_id).cloned();
            if let Some(previous) = previous {
                if previous != user_id {
                    if let Some(fan) = Self::unregister_locked(&mut state, conn_id) {
                        fans.push(fan);
                    }
                    debug!(
                        conn_id = %conn_id,
                        from = %previous,
                        to = %user_id,
                        "connection re-registered under new identity"
                    );
                }
            }

            state.owners.insert(*conn_id, user_id.to_string());
            state
                .sessions
                .entry(user_id.to_string())
                .or_default()
                .insert(*conn_id);

            debug!(conn_id = %conn_id, user_id = %user_id, "session registered");

            if let Some(fan) = Self::snapshot_locked(&state, user_id) {
                fans.push(fan);
            }
            fans
        };

        for fan in fans {
            self.deliver(fan);
        }
    }

    /// Removes a connection from its session set without touching the
    /// registry. Idempotent. Exposed for completeness; the close path
    /// goes through [`disconnect`](Self::disconnect).
    pub fn unregister(&self, conn_id: &ConnectionId) {
        let fan = Self::unregister_locked(&mut self.lock(), conn_id);
        if let Some(fan) = fan {
            self.deliver(fan);
        }
    }

    /// Current session count for a user; 0 when absent.
    pub fn count_for(&self, user_id: &str) -> usize {
        self.lock()
            .sessions
            .get(user_id)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    // ── Broadcast ────────────────────────────────────────────────

    /// Pushes the current count to every member of one user's session
    /// set. A user with no members is a no-op.
    pub fn broadcast_user(&self, user_id: &str) {
        let fan = Self::snapshot_locked(&self.lock(), user_id);
        if let Some(fan) = fan {
            self.deliver(fan);
        }
    }

    /// Pushes current counts to every registered user. The periodic
    /// refresh path; the consistency backstop when an event-triggered
    /// broadcast was lost.
    pub fn broadcast_all(&self) {
        let fans: Vec<FanOut> = {
            let state = self.lock();
            let users: Vec<String> = state.sessions.keys().cloned().collect();
            users
                .iter()
                .filter_map(|user_id| Self::snapshot_locked(&state, user_id))
                .collect()
        };

        for fan in fans {
            self.deliver(fan);
        }
    }

    // ── Heartbeat ────────────────────────────────────────────────

    /// One probe sweep over every open connection.
    ///
    /// Connections that did not answer the previous probe are
    /// terminated; the rest get their liveness flag cleared and a new
    /// probe. One missed full sweep interval is enough for eviction —
    /// fast dead-peer detection is preferred over tolerating network
    /// jitter. Loosen with a miss-count threshold if that trade-off
    /// changes.
    pub fn sweep(&self) {
        let (expired, probed) = {
            let state = self.lock();
            let mut expired = Vec::new();
            let mut probed = Vec::new();
            for handle in state.connections.values() {
                if !handle.is_open() {
                    continue;
                }
                if handle.is_alive() {
                    handle.clear_liveness();
                    probed.push(handle.clone());
                } else {
                    expired.push(handle.clone());
                }
            }
            (expired, probed)
        };

        for handle in expired {
            info!(conn_id = %handle.id, "heartbeat timeout, evicting connection");
            self.metrics.heartbeat_eviction();
            self.terminate(&handle.id);
        }

        for handle in probed {
            if !handle.send(Frame::Ping) {
                debug!(conn_id = %handle.id, "probe not queued");
            }
        }
    }

    // ── Shutdown ─────────────────────────────────────────────────

    /// Stops the background loops and closes every connection.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let handles: Vec<Arc<ConnectionHandle>> = {
            let mut state = self.lock();
            let handles = state.connections.values().cloned().collect();
            state.connections.clear();
            state.sessions.clear();
            state.owners.clear();
            handles
        };

        for handle in &handles {
            handle.close();
        }

        info!(count = handles.len(), "presence engine shut down");
    }

    // ── Internals ────────────────────────────────────────────────

    /// Removes `conn_id` from its session set. Returns the delivery for
    /// the surviving members, or `None` when the connection was not a
    /// member or its set became empty (empty sets are deleted, not
    /// broadcast to).
    fn unregister_locked(state: &mut PresenceState, conn_id: &ConnectionId) -> Option<FanOut> {
        let user_id = state.owners.remove(conn_id)?;

        let emptied = match state.sessions.get_mut(&user_id) {
            Some(members) => {
                members.remove(conn_id);
                members.is_empty()
            }
            None => return None,
        };

        if emptied {
            state.sessions.remove(&user_id);
            debug!(user_id = %user_id, "last session closed, set deleted");
            return None;
        }

        Self::snapshot_locked(state, &user_id)
    }

    /// Computes a count delivery for one user under the lock.
    fn snapshot_locked(state: &PresenceState, user_id: &str) -> Option<FanOut> {
        let members = state.sessions.get(user_id)?;
        let targets: Vec<Arc<ConnectionHandle>> = members
            .iter()
            .filter_map(|id| state.connections.get(id).cloned())
            .collect();
        if targets.is_empty() {
            return None;
        }
        Some(FanOut {
            user_id: user_id.to_string(),
            count: members.len(),
            targets,
        })
    }

    /// Fans a count notification out to the snapshot's members.
    /// Individual failures are logged and skipped.
    fn deliver(&self, fan: FanOut) {
        let payload = OutboundMessage::sessions(fan.count).encode();
        for handle in &fan.targets {
            if handle.send(Frame::Text(payload.clone())) {
                self.metrics.frame_sent();
            } else {
                warn!(
                    conn_id = %handle.id,
                    user_id = %fan.user_id,
                    "session update not delivered, skipping member"
                );
                self.metrics.frame_dropped();
            }
        }
        self.metrics.broadcast_sent();
    }
}
