//! Chat model trait for generating answers from conversation messages.

use async_trait::async_trait;

use crate::error::ModelError;
use crate::types::{ConversationTurn, TokenUsage};

/// A single chat model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Ordered messages: prior history turns followed by the current prompt.
    pub messages: Vec<ConversationTurn>,
    /// Maximum number of tokens the model may generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a request with the default generation parameters
    /// (2000 max tokens, temperature 0.1).
    pub fn new(messages: Vec<ConversationTurn>) -> Self {
        Self { messages, max_tokens: 2000, temperature: 0.1 }
    }
}

/// The generated text plus the provider's token accounting for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// The generated text.
    pub text: String,
    /// Token usage reported by the provider for this call.
    pub usage: TokenUsage,
}

/// A chat model invoked once per request, call/return.
///
/// Implementations wrap a hosted provider behind a unified async interface
/// and are responsible for parsing the provider's response envelope into
/// generated text and token counts.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_core::{ChatModel, ChatRequest, ConversationTurn};
///
/// let request = ChatRequest::new(vec![ConversationTurn::user("hello")]);
/// let response = model.invoke(request).await?;
/// println!("{} ({} tokens)", response.text, response.usage.total_tokens);
/// ```
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Invoke the model exactly once with the given messages.
    async fn invoke(&self, request: ChatRequest) -> Result<ChatResponse, ModelError>;
}
