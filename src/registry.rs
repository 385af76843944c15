//! Who is present: connection id → announced display name.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::protocol::ConnectionId;

/// Identity state for all connected clients.
///
/// An entry exists exactly while a connection is open *and* has announced a
/// display name with a JOIN. Constructed once at startup and handed to the
/// router; nothing else writes to it. Display names are not required to be
/// unique across connections.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a connection with a display name. Rebinding the same
    /// connection overwrites the previous name, so a client may re-announce
    /// itself.
    pub async fn bind(&self, conn: &ConnectionId, username: String) {
        self.sessions.write().await.insert(conn.clone(), username);
    }

    /// Display name bound to this connection, if it has announced one.
    pub async fn lookup(&self, conn: &ConnectionId) -> Option<String> {
        self.sessions.read().await.get(conn).cloned()
    }

    /// Remove the binding and return it in one step, so the caller can tell
    /// whether a departure needs announcing. Unbinding an unknown id is a
    /// no-op returning `None`, which makes duplicate disconnect
    /// notifications harmless.
    pub async fn unbind(&self, conn: &ConnectionId) -> Option<String> {
        self.sessions.write().await.remove(conn)
    }

    /// Number of connections that have announced a display name.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
