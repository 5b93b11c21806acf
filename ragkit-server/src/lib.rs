//! # ragkit-server
//!
//! HTTP and websocket front end for the answering engine. REST endpoints
//! cover chat, document listing, and history management; `/ws/chat` speaks a
//! per-message JSON protocol for interactive clients.

pub mod handlers;
pub mod ws;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ragkit_engine::AnswerEngine;
use ragkit_retrieval::DocumentCatalog;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The answering engine behind every chat endpoint.
    pub engine: Arc<AnswerEngine>,
    /// Lists what the retrieval backend has ingested.
    pub catalog: Arc<dyn DocumentCatalog>,
}

/// Assemble the full router with tracing and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .route("/api/documents", get(handlers::list_documents))
        .route("/api/chat-history/{session_id}", delete(handlers::clear_history))
        .route("/ws/chat", get(ws::chat_socket))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
