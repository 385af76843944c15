//! The gateway's table of open connections and their outbound queues.

use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};

use crate::protocol::{ChatMessage, ConnectionId};

/// All currently open sockets, keyed by connection id.
///
/// The gateway registers a connection as soon as its socket is accepted and
/// deregisters it when the socket task ends, so membership here is exactly
/// "currently active". Delivery is fire-and-forget: events are queued onto
/// each connection's unbounded channel and the socket task drains the queue
/// onto the wire at its own pace.
#[derive(Default)]
pub struct ConnectionTable {
    connections: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ChatMessage>>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, conn: ConnectionId, tx: mpsc::UnboundedSender<ChatMessage>) {
        self.connections.write().await.insert(conn, tx);
    }

    pub async fn deregister(&self, conn: &ConnectionId) {
        self.connections.write().await.remove(conn);
    }

    /// Number of open connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Queue an event for a single connection. A send failure means the
    /// receiving socket task is already gone; its own cleanup path reports
    /// the disconnect, so there is nothing to do here but note it.
    pub async fn deliver(&self, conn: &ConnectionId, message: ChatMessage) {
        if let Some(tx) = self.connections.read().await.get(conn) {
            if tx.send(message).is_err() {
                tracing::debug!("outbound queue for {} is closed", conn);
            }
        }
    }

    /// Queue an event for every open connection and return how many queues
    /// accepted it. The read lock is held across the sends so the recipient
    /// set is a consistent snapshot; the sends themselves only enqueue and
    /// never block.
    pub async fn broadcast(&self, message: &ChatMessage) -> usize {
        self.fan_out(message, None).await
    }

    /// Like [`broadcast`](Self::broadcast), but skips `excluded`. Used for
    /// events announced on behalf of a connection that no longer has a
    /// socket to write to.
    pub async fn broadcast_except(&self, excluded: &ConnectionId, message: &ChatMessage) -> usize {
        self.fan_out(message, Some(excluded)).await
    }

    async fn fan_out(&self, message: &ChatMessage, excluded: Option<&ConnectionId>) -> usize {
        let connections = self.connections.read().await;
        let mut delivered = 0;
        for (conn, tx) in connections.iter() {
            if excluded == Some(conn) {
                continue;
            }
            if tx.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!("outbound queue for {} is closed", conn);
            }
        }
        delivered
    }
}
