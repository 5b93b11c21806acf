//! Error type for evaluation runs.

use thiserror::Error;

use ragkit_core::{EmbeddingError, ModelError};

/// Errors that abort an evaluation run.
///
/// Retrieval backend failures do not abort a run; they score as empty
/// retrieval for the affected case.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Embedding a question or answer failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// The answer-generation model failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Writing report files failed, or a dataset file could not be read.
    #[error("Evaluation I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A dataset file did not parse into the expected shape.
    #[error("Malformed dataset: {0}")]
    Dataset(String),
}

/// Convenience alias for evaluation results.
pub type Result<T> = std::result::Result<T, EvalError>;
