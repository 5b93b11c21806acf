//! # ragkit-model
//!
//! Provider integrations for the ragkit answering engine.
//!
//! - [`AnthropicChatModel`] — chat generation via the Anthropic messages API.
//! - [`OpenAIEmbeddingProvider`] — embeddings via the OpenAI embeddings API.
//! - [`mock`] — deterministic in-process doubles for tests and demos.
//!
//! All network clients use `reqwest` with typed request/response structs;
//! envelope parsing is validated against the providers' documented schemas
//! (see the parsing tests in [`anthropic`]).

pub mod anthropic;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicChatModel;
pub use mock::{MockChatModel, MockEmbeddingProvider};
pub use openai::OpenAIEmbeddingProvider;
