//! Websocket chat: one JSON request per message, one JSON reply per request.
//!
//! Any unusable frame — malformed JSON or a binary payload — gets an error
//! reply instead of closing the socket, so a buggy client can recover
//! without reconnecting.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::handlers::default_session;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct WsRequest {
    query: String,
    #[serde(default = "default_session")]
    session_id: String,
}

pub async fn chat_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle(socket, state))
}

async fn handle(mut socket: WebSocket, state: AppState) {
    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
        let Some(reply) = reply_for(&state, &message).await else {
            continue;
        };
        if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
            debug!("websocket client went away mid-reply");
            break;
        }
    }
}

/// The reply for one inbound frame; `None` for frames that need no reply
/// (ping/pong, handled by the transport).
async fn reply_for(state: &AppState, message: &Message) -> Option<Value> {
    match message {
        Message::Text(text) => Some(respond(state, text.as_str()).await),
        Message::Binary(_) => Some(json!({
            "status": "error",
            "message": "binary frames are not supported, send JSON text",
        })),
        _ => None,
    }
}

async fn respond(state: &AppState, raw: &str) -> Value {
    let request: WsRequest = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(e) => return json!({"status": "error", "message": format!("Malformed request: {e}")}),
    };
    match state.engine.answer(&request.query, &request.session_id).await {
        Ok(answer) => json!({
            "status": "success",
            "response": answer.text,
            "references": answer
                .sources
                .iter()
                .map(|source| json!({"content": source.content, "metadata": source.metadata}))
                .collect::<Vec<_>>(),
        }),
        Err(e) => json!({"status": "error", "message": e.to_string()}),
    }
}
