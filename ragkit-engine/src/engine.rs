//! The answer engine: embed, fan out, assemble, generate, record.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use ragkit_core::{ChatModel, ChatRequest, ConversationTurn, EmbeddingProvider, TokenUsage};
use ragkit_retrieval::{fan_out, RetrievedResult, Retriever, SearchQuery};
use ragkit_session::SessionStore;

use crate::context::{assemble, dedup_results};
use crate::error::{EngineError, Result};
use crate::prompt::grounded_prompt;

/// Reply returned when no backend produced any usable context.
const DEFAULT_NO_CONTEXT_REPLY: &str =
    "I could not find anything relevant to that question in the indexed documents.";

/// Generation and retrieval knobs, all defaulted.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Passages kept after dedup and fed to the model.
    pub top_k: usize,
    /// Generation cap passed to the chat model.
    pub max_tokens: u32,
    /// Sampling temperature passed to the chat model.
    pub temperature: f32,
    /// Optional wall-clock budget for the chat model call.
    pub generation_timeout: Option<Duration>,
    /// Reply used when retrieval produced no context.
    pub no_context_reply: String,
    /// Maximum backends queried concurrently during fan-out.
    pub fanout_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_tokens: 2000,
            temperature: 0.1,
            generation_timeout: None,
            no_context_reply: DEFAULT_NO_CONTEXT_REPLY.to_string(),
            fanout_concurrency: 4,
        }
    }
}

/// One answered query: the generated text, the passages it was grounded on,
/// and the token usage of the generation call (zero when no call was made).
#[derive(Debug, Clone)]
pub struct Answer {
    /// The answer text.
    pub text: String,
    /// Deduplicated source passages, best score first.
    pub sources: Vec<RetrievedResult>,
    /// Token usage for this call.
    pub usage: TokenUsage,
}

/// Builder for [`AnswerEngine`]. Validation happens in [`build`](Self::build).
#[derive(Default)]
pub struct AnswerEngineBuilder {
    embedding: Option<Arc<dyn EmbeddingProvider>>,
    model: Option<Arc<dyn ChatModel>>,
    store: Option<Arc<dyn SessionStore>>,
    retrievers: Vec<Arc<dyn Retriever>>,
    config: EngineConfig,
}

impl AnswerEngineBuilder {
    /// Set the embedding provider used to embed queries.
    pub fn embedding(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding = Some(provider);
        self
    }

    /// Set the chat model used for answer generation.
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the session store for history and usage accounting.
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add a retrieval backend. At least one is required.
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retrievers.push(retriever);
        self
    }

    /// Override the default configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and assemble the engine.
    pub fn build(self) -> Result<AnswerEngine> {
        let embedding = self
            .embedding
            .ok_or_else(|| EngineError::InvalidArgument("embedding provider is required".into()))?;
        let model = self
            .model
            .ok_or_else(|| EngineError::InvalidArgument("chat model is required".into()))?;
        let store = self
            .store
            .ok_or_else(|| EngineError::InvalidArgument("session store is required".into()))?;
        if self.retrievers.is_empty() {
            return Err(EngineError::InvalidArgument(
                "at least one retrieval backend is required".into(),
            ));
        }
        if self.config.top_k == 0 {
            return Err(EngineError::InvalidArgument("top_k must be at least 1".into()));
        }
        Ok(AnswerEngine {
            embedding,
            model,
            store,
            retrievers: self.retrievers,
            config: self.config,
        })
    }
}

/// Orchestrates one query end to end: embed the query once, fan it out to
/// every backend, dedup and assemble the merged results, generate a grounded
/// answer with session history, and record the exchange plus token usage.
pub struct AnswerEngine {
    embedding: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn ChatModel>,
    store: Arc<dyn SessionStore>,
    retrievers: Vec<Arc<dyn Retriever>>,
    config: EngineConfig,
}

impl AnswerEngine {
    /// Start building an engine.
    pub fn builder() -> AnswerEngineBuilder {
        AnswerEngineBuilder::default()
    }

    /// The session store this engine records into.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Answer a query within a session.
    ///
    /// Backend failures degrade the context instead of failing the call.
    /// When no context survives, a fixed reply is returned without invoking
    /// the model and the session's usage totals are left untouched. On a
    /// model failure the exchange is still recorded in history, usage stays
    /// untouched, and the error is returned.
    pub async fn answer(&self, query: &str, session_id: &str) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(EngineError::InvalidArgument("query must not be empty".into()));
        }
        if session_id.trim().is_empty() {
            return Err(EngineError::InvalidArgument("session id must not be empty".into()));
        }

        let embedding = self.embedding.embed(query).await?;
        let search = SearchQuery::new(query, embedding);

        let outcome = fan_out(
            &self.retrievers,
            &search,
            self.config.top_k,
            self.config.fanout_concurrency,
        )
        .await;
        debug!(
            session_id,
            backends_ok = outcome.results.len(),
            backends_failed = outcome.failures.len(),
            "retrieval fan-out complete"
        );

        let mut sources = dedup_results(&outcome.merged());
        sources.truncate(self.config.top_k);
        let context = assemble(&sources);

        if context.is_empty() {
            warn!(session_id, "no context retrieved, returning fixed reply");
            self.store.append(session_id, ConversationTurn::user(query)).await;
            self.store
                .append(session_id, ConversationTurn::assistant(&self.config.no_context_reply))
                .await;
            return Ok(Answer {
                text: self.config.no_context_reply.clone(),
                sources: Vec::new(),
                usage: TokenUsage::default(),
            });
        }

        let mut messages = self.store.history(session_id).await;
        messages.push(ConversationTurn::user(grounded_prompt(&context, query)));
        let request = ChatRequest {
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = match self.invoke_with_timeout(request).await {
            Ok(response) => response,
            Err(e) => {
                self.store.append(session_id, ConversationTurn::user(query)).await;
                self.store
                    .append(
                        session_id,
                        ConversationTurn::assistant(format!("Answer generation failed: {e}")),
                    )
                    .await;
                return Err(e);
            }
        };

        self.store.append(session_id, ConversationTurn::user(query)).await;
        self.store.append(session_id, ConversationTurn::assistant(&response.text)).await;
        self.store.record_usage(session_id, &response.usage).await;

        info!(
            session_id,
            sources = sources.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "answered query"
        );
        Ok(Answer { text: response.text, sources, usage: response.usage })
    }

    async fn invoke_with_timeout(
        &self,
        request: ChatRequest,
    ) -> Result<ragkit_core::ChatResponse> {
        match self.config.generation_timeout {
            Some(budget) => match tokio::time::timeout(budget, self.model.invoke(request)).await {
                Ok(outcome) => Ok(outcome?),
                Err(_) => Err(EngineError::GenerationTimeout { seconds: budget.as_secs() }),
            },
            None => Ok(self.model.invoke(request).await?),
        }
    }
}
