//! HTTP endpoints for liveness checks and a small operational snapshot.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Response structure for GET /api/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Open WebSocket connections
    pub connections: usize,
    /// Connections that have announced a display name
    pub participants: usize,
    pub server_now: String,
}

/// Liveness probe.
///
/// GET /api/health
pub async fn health() -> &'static str {
    "ok"
}

/// Current room occupancy.
///
/// GET /api/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        connections: state.connections.len().await,
        participants: state.registry.len().await,
        server_now: chrono::Utc::now().to_rfc3339(),
    })
}
