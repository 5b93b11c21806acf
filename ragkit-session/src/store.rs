//! The session store contract.

use async_trait::async_trait;

use ragkit_core::{ConversationTurn, TokenUsage};

/// Session-scoped conversation history and token accounting.
///
/// Looking up an unknown session creates a fresh empty history — no
/// operation here fails on a missing key. Mutations on one session are
/// serialized by the store; concurrent writers to the *same* session id are
/// outside the contract (single-writer assumption).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The retained turns for a session, oldest first.
    ///
    /// Under summary retention the first turn may be a rolling summary of
    /// older conversation.
    async fn history(&self, session_id: &str) -> Vec<ConversationTurn>;

    /// Append a turn to a session, applying the retention policy.
    async fn append(&self, session_id: &str, turn: ConversationTurn);

    /// Drop a session's history and counters.
    async fn clear(&self, session_id: &str);

    /// Fold one call's token usage into the session's running total.
    async fn record_usage(&self, session_id: &str, usage: &TokenUsage);

    /// The session's cumulative token usage.
    async fn usage(&self, session_id: &str) -> TokenUsage;
}
