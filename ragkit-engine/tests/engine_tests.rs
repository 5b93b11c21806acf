//! End-to-end answer flow over in-process doubles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ragkit_core::{ChatModel, ChatRequest, ChatResponse, ModelError, TokenUsage};
use ragkit_engine::{AnswerEngine, EngineConfig, EngineError};
use ragkit_model::{MockChatModel, MockEmbeddingProvider};
use ragkit_retrieval::{
    DocumentChunk, InMemoryIndex, Metadata, RetrievalError, RetrievedResult, Retriever,
    SearchQuery,
};
use ragkit_session::{InMemorySessionStore, RetentionPolicy, SessionStore};

const DIM: usize = 4;

fn chunk(content: &str, embedding: Vec<f32>) -> DocumentChunk {
    DocumentChunk { content: content.to_string(), metadata: Metadata::new(), embedding }
}

/// Index of Korean academic-regulation passages with axis-aligned embeddings.
async fn regulations_index() -> Arc<InMemoryIndex> {
    let index = InMemoryIndex::new(DIM);
    index
        .add_chunks(vec![
            chunk("조기졸업을 신청하려면 평량평균이 3.75 이상이어야 한다.", vec![1.0, 0.0, 0.0, 0.0]),
            chunk("수강신청은 매 학기 초 지정된 기간에 진행된다.", vec![0.0, 1.0, 0.0, 0.0]),
            chunk("중앙도서관은 시험 기간에 24시간 개방된다.", vec![0.0, 0.0, 1.0, 0.0]),
        ])
        .await
        .unwrap();
    Arc::new(index)
}

fn embedding_pinned_to_graduation() -> Arc<MockEmbeddingProvider> {
    Arc::new(
        MockEmbeddingProvider::new(DIM)
            .with_vector("조기졸업 요건이 뭐야?", vec![0.95, 0.2, 0.1, 0.0]),
    )
}

struct OutageRetriever;

#[async_trait]
impl Retriever for OutageRetriever {
    fn name(&self) -> &str {
        "outage"
    }

    async fn retrieve(
        &self,
        _query: &SearchQuery,
        _k: usize,
    ) -> Result<Vec<RetrievedResult>, RetrievalError> {
        Err(RetrievalError::Backend { backend: "outage".into(), message: "down".into() })
    }
}

struct SlowModel;

#[async_trait]
impl ChatModel for SlowModel {
    fn name(&self) -> &str {
        "slow"
    }

    async fn invoke(&self, _request: ChatRequest) -> Result<ChatResponse, ModelError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(ChatResponse { text: "too late".into(), usage: TokenUsage::default() })
    }
}

#[tokio::test]
async fn korean_query_is_answered_from_the_best_matching_passage() {
    let model = Arc::new(MockChatModel::with_reply(
        "조기졸업을 하려면 평량평균이 3.75 이상이어야 합니다.",
        TokenUsage::new(120, 45),
    ));
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(embedding_pinned_to_graduation())
        .model(model.clone())
        .store(store.clone())
        .retriever(regulations_index().await)
        .build()
        .unwrap();

    let answer = engine.answer("조기졸업 요건이 뭐야?", "student-1").await.unwrap();

    assert!(answer.sources[0].content.contains("평량평균이 3.75 이상"));
    assert!(answer.text.contains("3.75"));
    assert_eq!(answer.usage, TokenUsage::new(120, 45));

    // The exchange was recorded and usage accumulated.
    let history = store.history("student-1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "조기졸업 요건이 뭐야?");
    assert_eq!(store.usage("student-1").await.total_tokens, 165);

    // The prompt fed to the model carried the retrieved passage.
    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].messages.last().unwrap().content;
    assert!(prompt.contains("평량평균이 3.75 이상"));
    assert!(prompt.contains("조기졸업 요건이 뭐야?"));
}

#[tokio::test]
async fn usage_totals_grow_linearly_with_successful_calls() {
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(embedding_pinned_to_graduation())
        .model(Arc::new(MockChatModel::with_reply("답변", TokenUsage::new(10, 7))))
        .store(store.clone())
        .retriever(regulations_index().await)
        .build()
        .unwrap();

    for _ in 0..3 {
        engine.answer("조기졸업 요건이 뭐야?", "s").await.unwrap();
    }

    let usage = store.usage("s").await;
    assert_eq!(usage.input_tokens, 30);
    assert_eq!(usage.output_tokens, 21);
    assert_eq!(usage.total_tokens, 51);
}

#[tokio::test]
async fn failed_generation_leaves_usage_untouched_but_records_the_exchange() {
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(embedding_pinned_to_graduation())
        .model(Arc::new(MockChatModel::failing()))
        .store(store.clone())
        .retriever(regulations_index().await)
        .build()
        .unwrap();

    let outcome = engine.answer("조기졸업 요건이 뭐야?", "s").await;
    assert!(matches!(outcome, Err(EngineError::Model(_))));

    assert_eq!(store.usage("s").await, TokenUsage::default());
    let history = store.history("s").await;
    assert_eq!(history.len(), 2);
    assert!(history[1].content.contains("failed"));
}

#[tokio::test]
async fn empty_context_short_circuits_without_a_model_call() {
    let model = Arc::new(MockChatModel::with_reply("should not be called", TokenUsage::new(1, 1)));
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(Arc::new(MockEmbeddingProvider::new(DIM)))
        .model(model.clone())
        .store(store.clone())
        .retriever(Arc::new(InMemoryIndex::new(DIM)))
        .build()
        .unwrap();

    let answer = engine.answer("아무 질문", "s").await.unwrap();

    assert!(answer.sources.is_empty());
    assert_eq!(answer.usage, TokenUsage::default());
    assert_eq!(model.call_count(), 0);
    assert_eq!(store.usage("s").await, TokenUsage::default());
    // The canned reply still lands in history.
    assert_eq!(store.history("s").await.len(), 2);
}

#[tokio::test]
async fn failing_backend_degrades_context_instead_of_failing_the_call() {
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(embedding_pinned_to_graduation())
        .model(Arc::new(MockChatModel::with_reply("답변", TokenUsage::new(5, 5))))
        .store(store)
        .retriever(Arc::new(OutageRetriever))
        .retriever(regulations_index().await)
        .build()
        .unwrap();

    let answer = engine.answer("조기졸업 요건이 뭐야?", "s").await.unwrap();
    assert!(!answer.sources.is_empty());
    assert!(answer.sources[0].content.contains("평량평균"));
}

#[tokio::test]
async fn generation_timeout_is_reported_as_such() {
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(embedding_pinned_to_graduation())
        .model(Arc::new(SlowModel))
        .store(store)
        .retriever(regulations_index().await)
        .config(EngineConfig {
            generation_timeout: Some(Duration::from_millis(20)),
            ..EngineConfig::default()
        })
        .build()
        .unwrap();

    let outcome = engine.answer("조기졸업 요건이 뭐야?", "s").await;
    assert!(matches!(outcome, Err(EngineError::GenerationTimeout { .. })));
}

#[tokio::test]
async fn blank_arguments_are_rejected() {
    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Full));
    let engine = AnswerEngine::builder()
        .embedding(Arc::new(MockEmbeddingProvider::new(DIM)))
        .model(Arc::new(MockChatModel::with_reply("x", TokenUsage::default())))
        .store(store)
        .retriever(Arc::new(InMemoryIndex::new(DIM)))
        .build()
        .unwrap();

    assert!(matches!(engine.answer("  ", "s").await, Err(EngineError::InvalidArgument(_))));
    assert!(matches!(engine.answer("q", "").await, Err(EngineError::InvalidArgument(_))));
}

#[tokio::test]
async fn builder_requires_at_least_one_backend() {
    let outcome = AnswerEngine::builder()
        .embedding(Arc::new(MockEmbeddingProvider::new(DIM)))
        .model(Arc::new(MockChatModel::with_reply("x", TokenUsage::default())))
        .store(Arc::new(InMemorySessionStore::new(RetentionPolicy::Full)))
        .build();
    assert!(matches!(outcome, Err(EngineError::InvalidArgument(_))));
}
