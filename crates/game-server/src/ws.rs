//! WebSocket transport.
//!
//! Each socket gets a reader loop that feeds text frames to the dispatcher
//! and a writer task that drains the connection's outbound queue.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::dispatcher::ServerContext;
use crate::registry::Connection;

#[derive(Clone)]
struct AppState {
    ctx: Arc<ServerContext>,
    outbound_buffer: usize,
}

pub fn router(ctx: Arc<ServerContext>, config: &ServerConfig) -> Router {
    let state = AppState {
        ctx,
        outbound_buffer: config.outbound_buffer.max(1),
    };
    Router::new()
        .route(&config.ws_path, get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (conn, mut outbound) = Connection::channel(state.outbound_buffer);
    let conn_id = conn.id();
    info!(connection = %conn_id, "connection opened");

    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    warn!(connection = %conn_id, error = %e, "failed to encode message");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                debug!(connection = %conn_id, error = %e, "socket error");
                break;
            }
        };
        match msg {
            Message::Text(text) => state.ctx.handle_text(&conn, text.as_str()).await,
            Message::Close(_) => break,
            _ => continue,
        }
    }

    let games = state.ctx.registry().remove_connection(conn_id);
    drop(conn);
    if let Err(e) = writer.await {
        debug!(connection = %conn_id, error = %e, "writer task ended abnormally");
    }
    info!(connection = %conn_id, ?games, "connection closed");
}
