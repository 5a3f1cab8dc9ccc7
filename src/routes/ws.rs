//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! applied to the connection's game session; countdown events are merged into
//! the same loop so the session is only ever touched from this task.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::GameSession;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "workshop", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
  let mut session = GameSession::new(timer_tx);
  info!(target: "workshop", session = %session.id, "WebSocket connected");

  loop {
    let replies = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(msg) => {
            debug!(target: "workshop", session = %session.id, "WS received: {:?}", &msg);
            session.handle(msg, &state)
          }
          Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => continue,
        Some(Err(e)) => {
          error!(target: "workshop", session = %session.id, error = %e, "WS receive error");
          break;
        }
      },
      Some(ev) = timer_rx.recv() => session.on_timer(ev),
    };

    if !send_all(&mut socket, &replies).await {
      break;
    }
  }

  session.close(&state);
  info!(target: "workshop", session = %session.id, "WebSocket disconnected");
}

/// Serialize and send each reply. Returns false once the socket is gone.
async fn send_all(socket: &mut WebSocket, replies: &[ServerWsMessage]) -> bool {
  for reply in replies {
    let out = serde_json::to_string(reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "workshop", error = %e, "WS send error");
      return false;
    }
  }
  true
}
