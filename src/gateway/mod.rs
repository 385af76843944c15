//! WebSocket gateway: owns the sockets, feeds the router.

pub mod connections;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ChatMessage, ConnectionId};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one client connection for its whole lifetime.
///
/// Inbound frames are handed to the router one at a time, in arrival order.
/// Outbound events arrive on this connection's queue and are written to the
/// socket here, so a slow peer only ever delays itself.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn: ConnectionId = ulid::Ulid::new().to_string();
    tracing::info!("websocket connected: {}", conn);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ChatMessage>();
    state.connections.register(conn.clone(), tx).await;

    loop {
        tokio::select! {
            // Events queued for this connection
            outbound = rx.recv() => {
                let Some(event) = outbound else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("failed to encode outbound event: {}", e),
                }
            }

            // Frames from the client
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        // Rejections are logged and otherwise a no-op; the
                        // connection stays up and no one else hears about it.
                        if let Err(e) = state.router.on_inbound_message(&conn, &text).await {
                            tracing::warn!("rejected event from {}: {}", conn, e);
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::debug!("close frame from {}", conn);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("websocket error on {}: {}", conn, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Deregister first so the departure announcement can only reach sockets
    // that still have somewhere to go, then let the router retire the
    // identity state. This runs for every exit path: close frame, socket
    // error, or the stream simply ending.
    state.connections.deregister(&conn).await;
    state.router.on_connection_closed(&conn).await;
    tracing::info!("websocket closed: {}", conn);
}
