//! Error types for retrieval operations.

use thiserror::Error;

use ragkit_core::EmbeddingError;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The caller passed an invalid argument (k == 0, empty query, mismatched
    /// embedding dimensionality).
    #[error("Invalid retrieval argument: {0}")]
    InvalidArgument(String),

    /// A backend failed in a way that could not be absorbed.
    #[error("Retrieval backend error ({backend}): {message}")]
    Backend {
        /// The backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A backend exceeded its time budget.
    #[error("Retrieval timed out ({backend}) after {seconds}s")]
    Timeout {
        /// The backend that timed out.
        backend: String,
        /// The configured budget in seconds.
        seconds: u64,
    },

    /// The knowledge-base registry file could not be read or updated.
    #[error("Knowledge-base registry error: {0}")]
    Registry(String),

    /// An error propagated from embedding generation.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
