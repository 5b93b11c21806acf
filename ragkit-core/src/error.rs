//! Error types for provider interactions.

use thiserror::Error;

/// Errors from chat model invocations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider could not be reached or rejected the connection.
    #[error("Model transport error ({provider}): {message}")]
    Transport {
        /// The chat provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider's response envelope did not match the expected shape.
    #[error("Model response parsing error ({provider}): {message}")]
    Parsing {
        /// The chat provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The caller passed an invalid request.
    #[error("Invalid model request: {0}")]
    InvalidArgument(String),

    /// The invocation exceeded its time budget.
    #[error("Model invocation timed out ({provider}) after {seconds}s")]
    Timeout {
        /// The chat provider that timed out.
        provider: String,
        /// The configured budget in seconds.
        seconds: u64,
    },
}

/// Errors from embedding generation.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The provider could not be reached or rejected the connection.
    #[error("Embedding transport error ({provider}): {message}")]
    Transport {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider's response did not match the expected shape.
    #[error("Embedding response parsing error ({provider}): {message}")]
    Parsing {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The caller passed empty input text.
    #[error("Embedding input must not be empty")]
    EmptyInput,
}
