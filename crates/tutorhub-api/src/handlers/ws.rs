//! WebSocket upgrade handler — the transport edge of the presence
//! engine.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use tutorhub_realtime::{Frame, RemoteInfo};

use crate::state::AppState;

/// GET /ws — WebSocket upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket, addr))
}

/// Drives an established WebSocket connection: registers it with the
/// engine, forwards outbound frames, and feeds inbound traffic back.
async fn handle_socket(state: AppState, socket: WebSocket, addr: SocketAddr) {
    let protocol = socket.protocol().and_then(|p| p.to_str().ok().map(String::from));
    let (mut ws_tx, mut ws_rx) = socket.split();

    let remote = RemoteInfo {
        peer_addr: Some(addr),
        subprotocol: protocol,
    };
    let (handle, mut outbound_rx) = state.engine.accept(remote);
    let conn_id = handle.id;

    // Drain the engine's outbound queue onto the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let message = match frame {
                Frame::Text(text) => Message::Text(text.into()),
                Frame::Ping => Message::Ping(Bytes::new()),
                Frame::Close => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            };
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.engine.handle_inbound(&conn_id, text.as_str());
            }
            Ok(Message::Pong(_)) => {
                state.engine.mark_alive(&conn_id);
            }
            Ok(Message::Close(_)) => {
                debug!(conn_id = %conn_id, "client closed websocket");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "websocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.engine.disconnect(&conn_id);
}
