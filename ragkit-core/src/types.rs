//! Data types for conversation history and token accounting.

use serde::{Deserialize, Serialize};

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message submitted by the end user.
    User,
    /// A message produced by the model (or recorded on its behalf).
    Assistant,
}

/// A single turn in a session's conversation history.
///
/// Turns alternate logically between user and assistant, but stores must
/// tolerate any sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who authored the turn.
    pub role: Role,
    /// The turn's text content.
    pub content: String,
}

impl ConversationTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Token counts for a model invocation.
///
/// Serves both as a last-call snapshot and, via [`accumulate`](Self::accumulate),
/// as a cumulative running total per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub input_tokens: u64,
    /// Tokens produced by the model.
    pub output_tokens: u64,
    /// Sum of input and output tokens.
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a usage record from input/output counts.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self { input_tokens, output_tokens, total_tokens: input_tokens + output_tokens }
    }

    /// Fold another usage record into this running total.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates_all_counters() {
        let mut total = TokenUsage::default();
        total.accumulate(&TokenUsage::new(10, 5));
        total.accumulate(&TokenUsage::new(3, 2));
        assert_eq!(total, TokenUsage { input_tokens: 13, output_tokens: 7, total_tokens: 20 });
    }

    #[test]
    fn role_serializes_lowercase() {
        let turn = ConversationTurn::user("hi");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "user");
        let back: ConversationTurn = serde_json::from_value(json).unwrap();
        assert_eq!(back, turn);
    }
}
