use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::jwt::verify_access_token;
use crate::store::feed::{EventMask, Table};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Realtime changes for the signed-in user: `user_stats` inserts and updates,
/// and new `workouts` rows. Each message carries the full new row; clients
/// simply replace what they show.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    let user_id = match authenticate_ws(&state, query.token.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("WebSocket auth failed: {}", e);
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

fn authenticate_ws(state: &AppState, token: Option<&str>) -> Result<Uuid, &'static str> {
    let token = token.ok_or("Missing token query parameter")?;
    verify_access_token(token, &state.config)
        .map(|claims| claims.sub)
        .map_err(|_| "Invalid or expired token")
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let mut stats = state.feed.subscribe(Table::UserStats, EventMask::ALL);
    let mut workouts = state.feed.subscribe(Table::Workouts, EventMask::INSERT);

    tracing::debug!(user_id = %user_id, "WebSocket connection established");

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                event = stats.recv() => event,
                event = workouts.recv() => event,
            };
            let Some(event) = event else { break };
            if event.user_id != user_id {
                continue;
            }
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode change event");
                    continue;
                }
            };
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Nothing is expected from the client; read only to notice the close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(user_id = %user_id, "WebSocket connection closed");
}
