use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::{
    error::Result,
    middleware::auth::{authenticate, authenticate_token},
    services::realtime_service::RealtimeHub,
    AppState,
};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also arrive as `?token=`.
#[axum::debug_handler]
pub async fn socket(
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse> {
    let claims = match query.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => authenticate_token(token)?,
        None => authenticate(&headers)?,
    };
    let user_id = claims.user_id()?;
    let hub = state.realtime.clone();
    Ok(ws.on_upgrade(move |socket| relay(socket, hub, user_id)))
}

async fn relay(mut socket: WebSocket, hub: RealtimeHub, user_id: Uuid) {
    let mut events = hub.subscribe(user_id);
    tracing::debug!(%user_id, "realtime socket opened");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else { continue };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(%user_id, skipped, "realtime socket lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(events);
    hub.prune(user_id);
    tracing::debug!(%user_id, "realtime socket closed");
}
