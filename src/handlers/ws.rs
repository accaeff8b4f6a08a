//! WebSocket handler: live feed-event stream.
//!
//! A client may identify itself with `?token=<jwt>` or a bearer header; an
//! anonymous connection is allowed, an invalid token is not.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRequestParts, Query, State,
    },
    http::request::Parts,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::auth::bearer_token;
use crate::models::event::ServerMessage;
use crate::services::Connection;

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Optional identity for a socket, resolved before the upgrade.
pub struct SocketIdentity(pub Option<Uuid>);

#[axum::async_trait]
impl FromRequestParts<AppState> for SocketIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let params = Query::<WsParams>::from_request_parts(parts, state)
            .await
            .map(|Query(params)| params)
            .unwrap_or_default();
        let token = match params.token {
            Some(token) => Some(token),
            None => bearer_token(parts, state).await,
        };
        match token {
            Some(token) => {
                let claims = state.tokens().verify(&token)?;
                Ok(SocketIdentity(Some(claims.sub)))
            }
            None => Ok(SocketIdentity(None)),
        }
    }
}

/// GET /ws — upgrade to a WebSocket receiving `feed-event` frames.
pub async fn ws_handler(
    State(state): State<AppState>,
    SocketIdentity(user_id): SocketIdentity,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket, user_id))
}

async fn handle_socket(state: AppState, socket: WebSocket, user_id: Option<Uuid>) {
    let (connection, mut rx) = Connection::new(user_id);
    let connection_id = connection.id();

    match serde_json::to_string(&ServerMessage::Connected { connection_id }) {
        Ok(hello) => {
            connection.send(hello);
        }
        Err(e) => warn!(error = %e, "failed to encode hello frame"),
    }

    let handle = state.registry().register(connection);
    info!(connection_id = %connection_id, user_id = ?user_id, "ws connected");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // No client protocol beyond connect/close; inbound frames are drained and ignored.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "ws receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    handle.unregister();
    info!(connection_id = %connection_id, "ws disconnected");
}
