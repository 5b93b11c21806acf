//! # ragkit-session
//!
//! Conversation history keyed by opaque session identifier, with three
//! retention policies: keep everything, keep a fixed window of recent turns,
//! or fold older turns into a rolling model-generated summary.
//!
//! The store also carries the per-session cumulative [`TokenUsage`] counters
//! the answer engine updates after each successful generation.
//!
//! [`TokenUsage`]: ragkit_core::TokenUsage

pub mod memory;
pub mod store;

pub use memory::{InMemorySessionStore, RetentionPolicy};
pub use store::SessionStore;
