//! Wire protocol shared with chat clients.
//!
//! The three-field, three-variant event shape is a compatibility contract:
//! field names and `type` values must be preserved bit-for-bit so existing
//! clients keep working.

use serde::{Deserialize, Serialize};

/// Opaque per-connection handle, assigned by the gateway when a socket is
/// accepted and stable for the connection's lifetime.
pub type ConnectionId = String;

/// Destination prefix clients use to address events at the server.
pub const INBOUND_DESTINATION_PREFIX: &str = "/app";

/// The single shared topic every connected client listens on.
pub const BROADCAST_DESTINATION: &str = "/topic/public";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// A client announced its display name.
    Join,
    /// Free-form text from a client.
    Chat,
    /// A client went away. Only ever produced server-side.
    Leave,
}

/// One chat event. Immutable once constructed: the router forwards events
/// or builds new ones, it never edits them in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Display name of the sender. Absent only on inbound events from a
    /// client that has not announced itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Errors that can occur while decoding an inbound payload
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not a well-formed chat event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("JOIN event has no sender")]
    MissingSender,
}

impl ChatMessage {
    /// Build the LEAVE event announced on behalf of a departed client.
    pub fn leave(sender: String) -> Self {
        Self {
            kind: MessageKind::Leave,
            sender: Some(sender),
            content: String::new(),
        }
    }

    /// Decode a raw client payload.
    ///
    /// A JOIN must carry a sender; the name it announces is what the
    /// registry binds. Anything else that parses is accepted as-is —
    /// content is not validated beyond parseability.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let message: ChatMessage = serde_json::from_str(raw)?;
        if message.kind == MessageKind::Join && message.sender.is_none() {
            return Err(DecodeError::MissingSender);
        }
        Ok(message)
    }
}
