//! In-memory session store with configurable retention.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use async_trait::async_trait;
use ragkit_core::{ChatModel, ChatRequest, ConversationTurn, TokenUsage};

use crate::store::SessionStore;

/// Prefix used when a rolling summary is surfaced as a history turn.
const SUMMARY_PREFIX: &str = "Conversation summary:";

/// Template for folding turns into the rolling summary.
const SUMMARIZE_TEMPLATE: &str = "Progressively summarize the conversation below, \
folding it into the previous summary and returning one updated summary. \
Keep every concrete fact a follow-up question might rely on.\n\n\
Previous summary:\n{summary}\n\nNew conversation lines:\n{turns}\n\nUpdated summary:";

/// How retained history is bounded per session.
#[derive(Clone)]
pub enum RetentionPolicy {
    /// Unbounded append. Memory grows with conversation length; intended for
    /// short-lived sessions.
    Full,
    /// Keep only the most recent `n` turns, evicting oldest-first on append.
    Window(usize),
    /// Fold turns into a rolling model-generated summary once their estimated
    /// token size exceeds `token_budget`.
    Summary {
        /// Estimated-token threshold that triggers a fold.
        token_budget: usize,
        /// The model used to produce the summary.
        model: Arc<dyn ChatModel>,
    },
}

#[derive(Default)]
struct SessionState {
    turns: Vec<ConversationTurn>,
    summary: Option<String>,
    usage: TokenUsage,
}

/// A process-local [`SessionStore`].
///
/// Sessions are created on first reference and live until cleared or the
/// process exits. The map lock is held only to look up a session's entry;
/// each session carries its own lock, so mutation is serialized per session
/// and a summarization call in one session never stalls the others.
pub struct InMemorySessionStore {
    policy: RetentionPolicy,
    sessions: Mutex<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl InMemorySessionStore {
    /// Create a store with the given retention policy.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy, sessions: Mutex::new(HashMap::new()) }
    }

    /// The session's entry, created if absent. The map lock is released
    /// before the entry is used.
    async fn session(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(session_id.to_string()).or_default())
    }

    /// The session's entry, or `None` if it was never written.
    async fn existing_session(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// Rough token estimate: one token per four characters, minimum one.
    fn estimate_tokens(text: &str) -> usize {
        text.chars().count() / 4 + 1
    }

    fn turns_estimate(turns: &[ConversationTurn]) -> usize {
        turns.iter().map(|turn| Self::estimate_tokens(&turn.content)).sum()
    }

    fn transcript(turns: &[ConversationTurn]) -> String {
        turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ragkit_core::Role::User => "user",
                    ragkit_core::Role::Assistant => "assistant",
                };
                format!("{role}: {}", turn.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn maybe_summarize(
        policy: &RetentionPolicy,
        session_id: &str,
        state: &mut SessionState,
    ) {
        let RetentionPolicy::Summary { token_budget, model } = policy else {
            return;
        };
        if Self::turns_estimate(&state.turns) <= *token_budget {
            return;
        }

        let prompt = SUMMARIZE_TEMPLATE
            .replace("{summary}", state.summary.as_deref().unwrap_or("(none)"))
            .replace("{turns}", &Self::transcript(&state.turns));

        let request = ChatRequest::new(vec![ConversationTurn::user(prompt)]);
        match model.invoke(request).await {
            Ok(response) => {
                debug!(
                    session_id,
                    folded_turns = state.turns.len(),
                    "folded turns into rolling summary"
                );
                state.summary = Some(response.text);
                state.turns.clear();
            }
            Err(e) => {
                // Falling back to unbounded append loses no turns; the fold
                // is retried on a later append.
                warn!(session_id, error = %e, "summarization failed, keeping raw turns");
            }
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let Some(entry) = self.existing_session(session_id).await else {
            return Vec::new();
        };
        let state = entry.lock().await;
        let mut turns = Vec::with_capacity(state.turns.len() + 1);
        if let Some(summary) = &state.summary {
            turns.push(ConversationTurn::assistant(format!("{SUMMARY_PREFIX} {summary}")));
        }
        turns.extend(state.turns.iter().cloned());
        turns
    }

    async fn append(&self, session_id: &str, turn: ConversationTurn) {
        let entry = self.session(session_id).await;
        // Only this session's lock is held across the fold; a slow
        // summarization model blocks this session alone.
        let mut state = entry.lock().await;
        state.turns.push(turn);

        match &self.policy {
            RetentionPolicy::Full => {}
            RetentionPolicy::Window(n) => {
                let excess = state.turns.len().saturating_sub(*n);
                if excess > 0 {
                    state.turns.drain(..excess);
                }
            }
            policy @ RetentionPolicy::Summary { .. } => {
                Self::maybe_summarize(policy, session_id, &mut state).await;
            }
        }
    }

    async fn clear(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(session_id);
    }

    async fn record_usage(&self, session_id: &str, usage: &TokenUsage) {
        let entry = self.session(session_id).await;
        let mut state = entry.lock().await;
        state.usage.accumulate(usage);
    }

    async fn usage(&self, session_id: &str) -> TokenUsage {
        let Some(entry) = self.existing_session(session_id).await else {
            return TokenUsage::default();
        };
        let state = entry.lock().await;
        state.usage
    }
}
