//! Inbound and outbound control message definitions.
//!
//! Wire names are camelCase (`userId`, `getUpdates`) to match the
//! client protocol.

use serde::{Deserialize, Serialize};

/// Control messages sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Register the sending connection under a user identity.
    #[serde(rename_all = "camelCase")]
    Register {
        /// Opaque user identity string.
        user_id: String,
    },
    /// Request an immediate session-count broadcast for a user.
    #[serde(rename_all = "camelCase")]
    GetUpdates {
        /// Opaque user identity string.
        user_id: String,
    },
}

/// Notifications pushed by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Sent once, immediately after accept.
    Connection {
        /// Always `"connected"`.
        status: String,
    },
    /// Current concurrent-session count for the receiving user.
    Sessions {
        /// Number of live registered connections.
        count: usize,
    },
}

impl OutboundMessage {
    /// The post-accept greeting.
    pub fn connected() -> Self {
        Self::Connection {
            status: "connected".to_string(),
        }
    }

    /// A session-count notification.
    pub fn sessions(count: usize) -> Self {
        Self::Sessions { count }
    }

    /// Serializes to the JSON wire form.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_register_wire_format() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"register","userId":"u1"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::Register { user_id } if user_id == "u1"));
    }

    #[test]
    fn test_inbound_get_updates_wire_format() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"getUpdates","userId":"u2"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::GetUpdates { user_id } if user_id == "u2"));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = serde_json::from_str::<InboundMessage>(r#"{"type":"chat","text":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_outbound_wire_format() {
        assert_eq!(
            OutboundMessage::connected().encode(),
            r#"{"type":"connection","status":"connected"}"#
        );
        assert_eq!(
            OutboundMessage::sessions(2).encode(),
            r#"{"type":"sessions","count":2}"#
        );
    }
}
