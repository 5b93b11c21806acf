//! Chat model backed by the Anthropic messages API.
//!
//! Sends a single `POST /v1/messages` per invocation and parses the response
//! envelope into generated text plus token usage. The envelope fields follow
//! the documented messages schema: text lives in `content[].text` and token
//! counts in `usage.input_tokens` / `usage.output_tokens`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use ragkit_core::{ChatModel, ChatRequest, ChatResponse, ModelError, Role, TokenUsage};

/// The default Anthropic messages endpoint.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// The API version header value the client pins.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The default chat model.
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// A [`ChatModel`] backed by the Anthropic messages API.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_model::AnthropicChatModel;
///
/// let model = AnthropicChatModel::from_env()?;
/// let response = model.invoke(request).await?;
/// ```
pub struct AnthropicChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicChatModel {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ModelError::InvalidArgument("API key must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: ANTHROPIC_MESSAGES_URL.into(),
        })
    }

    /// Create a new client from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ModelError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            ModelError::InvalidArgument("ANTHROPIC_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `claude-3-5-sonnet-latest`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the messages endpoint (gateways, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convert conversation turns into API messages.
    ///
    /// The messages API requires strictly alternating roles starting with
    /// `user`, so consecutive same-role turns are coalesced and any leading
    /// assistant turns (a rolling summary, for instance) are lifted into the
    /// top-level `system` field.
    fn build_messages(request: &ChatRequest) -> (Option<String>, Vec<ApiMessage>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut messages: Vec<ApiMessage> = Vec::new();

        for turn in &request.messages {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            if messages.is_empty() && turn.role == Role::Assistant {
                system_parts.push(&turn.content);
                continue;
            }
            match messages.last_mut() {
                Some(last) if last.role == role => {
                    last.content.push('\n');
                    last.content.push_str(&turn.content);
                }
                _ => messages.push(ApiMessage { role, content: turn.content.clone() }),
            }
        }

        let system =
            if system_parts.is_empty() { None } else { Some(system_parts.join("\n")) };
        (system, messages)
    }
}

// ── Anthropic API request/response types ───────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: ApiUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessagesResponse {
    /// Concatenate all text blocks of the response.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

// ── ChatModel implementation ───────────────────────────────────────

#[async_trait]
impl ChatModel for AnthropicChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, request: ChatRequest) -> Result<ChatResponse, ModelError> {
        if request.messages.is_empty() {
            return Err(ModelError::InvalidArgument("messages must not be empty".into()));
        }

        let (system, messages) = Self::build_messages(&request);
        if messages.is_empty() {
            return Err(ModelError::InvalidArgument(
                "at least one user message is required".into(),
            ));
        }

        debug!(
            provider = "Anthropic",
            model = %self.model,
            message_count = messages.len(),
            "invoking chat model"
        );

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system,
            messages,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Anthropic", error = %e, "request failed");
                ModelError::Transport {
                    provider: "Anthropic".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Anthropic", %status, "API error");
            return Err(ModelError::Transport {
                provider: "Anthropic".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let envelope: MessagesResponse = response.json().await.map_err(|e| {
            error!(provider = "Anthropic", error = %e, "failed to parse response");
            ModelError::Parsing {
                provider: "Anthropic".into(),
                message: format!("failed to parse response envelope: {e}"),
            }
        })?;

        Ok(ChatResponse {
            text: envelope.text(),
            usage: TokenUsage::new(envelope.usage.input_tokens, envelope.usage.output_tokens),
        })
    }
}

// ── Response envelope parsing tests ────────────────────────────────
