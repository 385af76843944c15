//! Routing core: decides who hears which event.
//!
//! The router owns no sockets and performs no I/O beyond queueing onto
//! per-connection channels, which keeps it testable without a transport.
//! Nothing here can fail for anything but a bad inbound payload, and a
//! rejection is always scoped to that single event.

use std::sync::Arc;

use crate::gateway::connections::ConnectionTable;
use crate::protocol::{ChatMessage, ConnectionId, DecodeError, MessageKind};
use crate::registry::SessionRegistry;

/// Why an inbound event was rejected. The connection itself stays up.
#[derive(Debug, thiserror::Error)]
pub enum InboundError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("clients may not send {0:?} events")]
    UnsupportedKind(MessageKind),
}

pub struct BroadcastRouter {
    registry: Arc<SessionRegistry>,
    connections: Arc<ConnectionTable>,
}

impl BroadcastRouter {
    pub fn new(registry: Arc<SessionRegistry>, connections: Arc<ConnectionTable>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    /// A raw client payload arrived on `conn`. Returns how many connections
    /// the event was queued for.
    ///
    /// JOIN binds the announced name and is echoed to every active
    /// connection, the joining one included. CHAT is relayed unchanged to
    /// everyone, sender included. LEAVE is only ever synthesized
    /// server-side, so an inbound one is rejected. A payload that fails to
    /// decode mutates nothing and reaches no one.
    pub async fn on_inbound_message(
        &self,
        conn: &ConnectionId,
        raw: &str,
    ) -> Result<usize, InboundError> {
        let message = ChatMessage::decode(raw)?;
        match message.kind {
            MessageKind::Join => {
                // decode() already rejected a JOIN without a sender
                if let Some(name) = message.sender.as_deref() {
                    self.registry.bind(conn, name.to_string()).await;
                    tracing::info!("{} joined as {}", conn, name);
                }
                Ok(self.connections.broadcast(&message).await)
            }
            MessageKind::Chat => {
                if let Some(name) = self.registry.lookup(conn).await {
                    tracing::debug!("chat from {} ({})", name, conn);
                } else {
                    tracing::debug!("chat from unannounced connection {}", conn);
                }
                Ok(self.connections.broadcast(&message).await)
            }
            MessageKind::Leave => Err(InboundError::UnsupportedKind(MessageKind::Leave)),
        }
    }

    /// The gateway lost `conn`, for whatever reason. Retires its registry
    /// entry and, if it had announced a name, tells everyone still
    /// connected. Returns how many connections were told. Safe to call more
    /// than once for the same id.
    pub async fn on_connection_closed(&self, conn: &ConnectionId) -> usize {
        match self.registry.unbind(conn).await {
            Some(username) => {
                tracing::info!("{} ({}) disconnected", username, conn);
                let leave = ChatMessage::leave(username);
                self.connections.broadcast_except(conn, &leave).await
            }
            // Never announced itself, so there is nothing to tell the room.
            None => 0,
        }
    }
}
