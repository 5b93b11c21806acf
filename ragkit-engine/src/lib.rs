//! # ragkit-engine
//!
//! Answer orchestration for retrieval-augmented question answering. One
//! call to [`AnswerEngine::answer`] embeds the query, fans it out across the
//! configured retrieval backends, deduplicates and assembles the merged
//! passages into a context block, generates a grounded answer with the
//! session's conversation history, and records the exchange and its token
//! usage back into the session store.
//!
//! Retrieval is best-effort: a failing backend shrinks the context, it never
//! fails the request. An empty context short-circuits to a fixed reply
//! without spending model tokens.

pub mod context;
pub mod engine;
pub mod error;
pub mod prompt;

pub use context::{assemble, dedup_results};
pub use engine::{Answer, AnswerEngine, AnswerEngineBuilder, EngineConfig};
pub use error::{EngineError, Result};
pub use prompt::grounded_prompt;
