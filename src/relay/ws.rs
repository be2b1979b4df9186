// src/relay/ws.rs

//! WebSocket transport for the relay (axum).
//!
//! `GET /ws/collaboration?projectId=<id>&userId=<id>` upgrades to a socket.
//! Each socket gets a reader task (client text → [`RelayHandle::inbound`])
//! and a writer task (outbox → socket). Every socket write is bounded by the
//! configured send timeout; a peer that cannot keep up is disconnected.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::relay::hub::RelayHandle;
use crate::types::{ProjectId, UserId};

pub const COLLABORATION_PATH: &str = "/ws/collaboration";

/// Shared state for the routes.
#[derive(Debug, Clone)]
pub struct RelayState {
    pub relay: RelayHandle,
    pub send_timeout: Duration,
}

/// Query parameters accepted on connect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    pub project_id: Option<ProjectId>,
    pub user_id: Option<UserId>,
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(COLLABORATION_PATH, get(collaboration_websocket))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn collaboration_websocket(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    debug!(?params, "collaboration websocket upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

async fn handle_socket(socket: WebSocket, params: ConnectParams, state: RelayState) {
    let (id, mut outbox_rx) = match state.relay.connect(params.user_id, params.project_id).await {
        Ok(pair) => pair,
        Err(e) => {
            error!("relay unavailable, closing socket: {e}");
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();
    let send_timeout = state.send_timeout;

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = outbox_rx.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!(connection = %id, error = %e, "failed to encode event");
                    continue;
                }
            };

            match timeout(send_timeout, sender.send(Message::Text(json.into()))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(connection = %id, error = %e, "socket send failed");
                    break;
                }
                Err(_) => {
                    warn!(
                        connection = %id,
                        timeout_ms = send_timeout.as_millis() as u64,
                        "socket send timed out; dropping connection"
                    );
                    break;
                }
            }
        }
    });

    let relay = state.relay.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let payload = match msg {
                Ok(Message::Text(text)) => text.as_str().to_owned(),
                Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                Ok(Message::Close(_)) => {
                    debug!(connection = %id, "client closed socket");
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!(connection = %id, error = %e, "socket receive error");
                    break;
                }
            };

            if relay.inbound(id, payload).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if let Err(e) = state.relay.leave(id).await {
        warn!(connection = %id, "could not deregister connection: {e}");
    }
    info!(connection = %id, "websocket closed");
}
