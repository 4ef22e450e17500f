//! Inbound control-message routing.

use tracing::warn;

use crate::connection::handle::ConnectionId;
use crate::engine::PresenceEngine;
use crate::message::types::InboundMessage;

impl PresenceEngine {
    /// Routes one inbound text frame.
    ///
    /// Malformed payloads and unknown tags are logged and dropped; the
    /// connection stays open either way.
    pub fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let message: InboundMessage = match serde_json::from_str(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "dropping unroutable control message");
                self.metrics().message_rejected();
                return;
            }
        };

        match message {
            InboundMessage::Register { user_id } => self.register(&user_id, conn_id),
            InboundMessage::GetUpdates { user_id } => self.broadcast_user(&user_id),
        }
    }
}
