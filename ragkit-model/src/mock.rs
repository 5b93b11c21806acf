//! Deterministic in-process provider doubles for tests and demos.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use ragkit_core::{
    ChatModel, ChatRequest, ChatResponse, EmbeddingError, EmbeddingProvider, ModelError,
    TokenUsage,
};

/// A scripted [`ChatModel`] that replays canned responses and records every
/// request it receives.
///
/// Responses are consumed in FIFO order; once the queue is empty the fallback
/// reply is returned. A failing instance returns a transport error on every
/// call without consuming anything.
pub struct MockChatModel {
    queue: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
    fallback: ChatResponse,
    fail: bool,
}

impl MockChatModel {
    /// Create a mock whose every reply is `text` with the given usage.
    pub fn with_reply(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fallback: ChatResponse { text: text.into(), usage },
            fail: false,
        }
    }

    /// Create a mock that fails every invocation with a transport error.
    pub fn failing() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fallback: ChatResponse { text: String::new(), usage: TokenUsage::default() },
            fail: true,
        }
    }

    /// Queue a one-shot response ahead of the fallback reply.
    pub fn enqueue(&self, text: impl Into<String>, usage: TokenUsage) {
        let mut queue = self.queue.lock().unwrap();
        queue.push_back(ChatResponse { text: text.into(), usage });
    }

    /// All requests received so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of invocations received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock-chat"
    }

    async fn invoke(&self, request: ChatRequest) -> Result<ChatResponse, ModelError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(ModelError::Transport {
                provider: "mock-chat".into(),
                message: "simulated transport failure".into(),
            });
        }
        let mut queue = self.queue.lock().unwrap();
        Ok(queue.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

/// A deterministic [`EmbeddingProvider`] for tests.
///
/// Exact-match texts can be pinned to chosen vectors; everything else gets a
/// stable hash-derived vector of the configured dimensionality, so equal
/// inputs always embed equally.
pub struct MockEmbeddingProvider {
    dimensions: usize,
    pinned: HashMap<String, Vec<f32>>,
    fail: bool,
}

impl MockEmbeddingProvider {
    /// Create a provider producing vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, pinned: HashMap::new(), fail: false }
    }

    /// Create a provider that fails every call with a transport error.
    pub fn failing(dimensions: usize) -> Self {
        Self { dimensions, pinned: HashMap::new(), fail: true }
    }

    /// Pin an exact input text to a chosen vector.
    ///
    /// # Panics
    ///
    /// Panics if the vector's length does not match the configured
    /// dimensionality (test setup bug).
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimensions, "pinned vector has wrong dimensionality");
        self.pinned.insert(text.into(), vector);
        self
    }

    fn hashed_vector(&self, text: &str) -> Vec<f32> {
        // FNV-1a over the input seeds a small LCG per component.
        let mut seed: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.as_bytes() {
            seed ^= u64::from(*byte);
            seed = seed.wrapping_mul(0x0000_0100_0000_01b3);
        }
        let mut state = seed;
        (0..self.dimensions)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::Transport {
                provider: "mock-embedding".into(),
                message: "simulated transport failure".into(),
            });
        }
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(self.pinned.get(text).cloned().unwrap_or_else(|| self.hashed_vector(text)))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
