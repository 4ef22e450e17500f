//! Periodic session-count refresh background task.
//!
//! The event-triggered broadcast path lives inside the engine's
//! register/unregister operations; this loop is the consistency
//! backstop that re-pushes counts to every registered user on a fixed
//! period whether or not anything changed.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use crate::engine::PresenceEngine;

/// Spawns the periodic refresh loop. Stops when the engine's shutdown
/// flag is raised.
pub fn spawn(engine: Arc<PresenceEngine>) -> JoinHandle<()> {
    let mut shutdown = engine.shutdown_rx();
    let period = engine.config().broadcast_interval();

    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    engine.broadcast_all();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("broadcast scheduler stopped");
    })
}
