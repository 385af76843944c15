use std::sync::Arc;

use crate::gateway::connections::ConnectionTable;
use crate::registry::SessionRegistry;
use crate::router::BroadcastRouter;

/// Shared application state
///
/// The registry and connection table are constructed once here and injected
/// into the router; handlers reach everything through this struct rather
/// than any ambient global.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub connections: Arc<ConnectionTable>,
    pub router: Arc<BroadcastRouter>,
}

impl AppState {
    pub fn new() -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let connections = Arc::new(ConnectionTable::new());
        let router = Arc::new(BroadcastRouter::new(registry.clone(), connections.clone()));
        Self {
            registry,
            connections,
            router,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
