//! # ragkit-core
//!
//! Shared types and provider traits for the ragkit workspace.
//!
//! This crate defines the vocabulary the other `ragkit-*` crates speak:
//! conversation turns, token accounting, and the [`ChatModel`] and
//! [`EmbeddingProvider`] traits that external providers implement.
//! Concrete provider integrations live in `ragkit-model`.

pub mod embedding;
pub mod error;
pub mod model;
pub mod types;

pub use embedding::EmbeddingProvider;
pub use error::{EmbeddingError, ModelError};
pub use model::{ChatModel, ChatRequest, ChatResponse};
pub use types::{ConversationTurn, Role, TokenUsage};
