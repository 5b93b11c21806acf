//! Error type for answer orchestration.

use thiserror::Error;

use ragkit_core::{EmbeddingError, ModelError};

/// Errors surfaced by [`AnswerEngine::answer`](crate::AnswerEngine::answer).
///
/// Retrieval backend failures never appear here; they are absorbed during
/// fan-out and at worst shrink the assembled context.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller passed an empty query or session id, or the engine was
    /// misconfigured.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding the query failed. Without an embedding no vector backend
    /// can be queried, so this aborts the request.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// The chat model call failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The chat model call exceeded the configured time budget.
    #[error("Answer generation timed out after {seconds}s")]
    GenerationTimeout {
        /// The configured budget in seconds.
        seconds: u64,
    },
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
