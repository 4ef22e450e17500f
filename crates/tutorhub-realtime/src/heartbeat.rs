//! Heartbeat monitor background task.
//!
//! One sweep per interval over every open connection: evict those that
//! never answered the previous probe, re-probe the rest. See
//! [`PresenceEngine::sweep`] for the eviction policy.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use crate::engine::PresenceEngine;

/// Spawns the probe sweep loop. Stops when the engine's shutdown flag
/// is raised.
pub fn spawn(engine: Arc<PresenceEngine>) -> JoinHandle<()> {
    let mut shutdown = engine.shutdown_rx();
    let period = engine.config().heartbeat_interval();

    tokio::spawn(async move {
        let mut interval = time::interval(period);
        // The first tick fires immediately; skip it so fresh
        // connections get a full interval before their first probe.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    engine.sweep();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("heartbeat monitor stopped");
    })
}
