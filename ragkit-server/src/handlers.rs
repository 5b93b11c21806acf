//! REST handlers: chat, document listing, history management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use ragkit_engine::EngineError;
use ragkit_retrieval::{DocumentInfo, RetrievedResult};

use crate::AppState;

/// Source previews are cut to this many characters for the response payload.
const SOURCE_PREVIEW_CHARS: usize = 200;

/// Session id used when the client does not send one.
pub(crate) fn default_session() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    /// The user's question.
    pub query: String,
    /// Conversation to answer within; defaults to a shared session.
    #[serde(default = "default_session")]
    pub session_id: String,
}

/// A truncated source passage echoed back with the answer.
#[derive(Debug, Serialize)]
pub struct SourceView {
    /// Passage preview, at most [`SOURCE_PREVIEW_CHARS`] characters.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub response: String,
    pub sources: Vec<SourceView>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct DocumentsData {
    pub documents: Vec<DocumentInfo>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorBody { status: "error", message }))
}

fn engine_status(error: &EngineError) -> StatusCode {
    match error {
        EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Truncation respects char boundaries; sources are frequently Hangul.
pub(crate) fn source_view(result: &RetrievedResult) -> SourceView {
    SourceView {
        content: result.content.chars().take(SOURCE_PREVIEW_CHARS).collect(),
        page: result.metadata.get("page").cloned(),
        document_title: result
            .metadata
            .get("filename")
            .and_then(Value::as_str)
            .map(str::to_string),
        score: result.score,
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "message": "ragkit server is running"}))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    match state.engine.answer(&body.query, &body.session_id).await {
        Ok(answer) => Ok(Json(ChatResponseBody {
            response: answer.text,
            sources: answer.sources.iter().map(source_view).collect(),
        })),
        Err(e) => {
            error!(session_id = %body.session_id, error = %e, "chat request failed");
            Err(api_error(engine_status(&e), e.to_string()))
        }
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DocumentsData>>, ApiError> {
    match state.catalog.list_documents().await {
        Ok(documents) => Ok(Json(ApiResponse {
            status: "success",
            message: format!("Retrieved {} documents", documents.len()),
            data: DocumentsData { documents },
        })),
        Err(e) => {
            error!(error = %e, "document listing failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    state.engine.store().clear(&session_id).await;
    Json(json!({"status": "success", "message": "Chat history cleared"}))
}
