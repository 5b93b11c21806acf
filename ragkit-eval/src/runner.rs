//! Evaluation runner: score a dataset against one or more backends.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use ragkit_core::{ChatModel, ChatRequest, ConversationTurn, EmbeddingProvider};
use ragkit_engine::grounded_prompt;
use ragkit_retrieval::{Retriever, SearchQuery};

use crate::dataset::{EvalCase, EvalDataset};
use crate::error::Result;
use crate::metrics::{
    answer_relevancy, context_precision, context_recall, faithfulness, MetricScores,
};

/// One scored case.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    /// The question evaluated.
    pub question: String,
    /// The four metric scores.
    pub scores: MetricScores,
}

/// All case outcomes for one backend.
#[derive(Debug, Clone)]
pub struct BackendReport {
    /// The backend name.
    pub backend: String,
    /// The dataset name.
    pub dataset: String,
    /// Per-case outcomes, in dataset order.
    pub outcomes: Vec<CaseOutcome>,
}

/// Drives a dataset through retrieval (and optionally generation) and scores
/// each case.
///
/// Without a model, answer-based metrics are computed over the reference
/// answer, which measures whether retrieval surfaces the material the known
/// good answer needs. With a model, the generated answer is scored instead.
pub struct EvalRunner {
    embedding: Arc<dyn EmbeddingProvider>,
    model: Option<Arc<dyn ChatModel>>,
    top_k: usize,
    concurrency: usize,
}

impl EvalRunner {
    /// Create a retrieval-only runner with the default `top_k` of 3.
    pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedding, model: None, top_k: 3, concurrency: 2 }
    }

    /// Score generated answers instead of reference answers.
    pub fn with_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Override how many passages are retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Override how many backends are evaluated concurrently (default 2).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Evaluate every backend against the dataset.
    ///
    /// Backends are evaluated concurrently; reports come back sorted by
    /// backend name.
    pub async fn run(
        &self,
        backends: &[Arc<dyn Retriever>],
        dataset: &EvalDataset,
    ) -> Result<Vec<BackendReport>> {
        let tasks = backends.iter().map(|backend| {
            let backend = Arc::clone(backend);
            async move { self.evaluate_backend(backend, dataset).await }
        });
        let mut reports: Vec<BackendReport> = stream::iter(tasks)
            .buffer_unordered(self.concurrency.max(1))
            .collect::<Vec<Result<BackendReport>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        reports.sort_by(|a, b| a.backend.cmp(&b.backend));
        Ok(reports)
    }

    async fn evaluate_backend(
        &self,
        backend: Arc<dyn Retriever>,
        dataset: &EvalDataset,
    ) -> Result<BackendReport> {
        let mut outcomes = Vec::with_capacity(dataset.cases.len());
        for case in &dataset.cases {
            outcomes.push(self.evaluate_case(&backend, case).await?);
        }
        info!(backend = %backend.name(), dataset = %dataset.name, cases = outcomes.len(),
            "backend evaluated");
        Ok(BackendReport {
            backend: backend.name().to_string(),
            dataset: dataset.name.clone(),
            outcomes,
        })
    }

    async fn evaluate_case(
        &self,
        backend: &Arc<dyn Retriever>,
        case: &EvalCase,
    ) -> Result<CaseOutcome> {
        let question_embedding = self.embedding.embed(&case.question).await?;
        let query = SearchQuery::new(case.question.clone(), question_embedding.clone());

        let retrieved: Vec<String> = match backend.retrieve(&query, self.top_k).await {
            Ok(results) => results.into_iter().map(|r| r.content).collect(),
            Err(e) => {
                warn!(backend = %backend.name(), question = %case.question, error = %e,
                    "retrieval failed, scoring as empty");
                Vec::new()
            }
        };

        let answer = match (&self.model, retrieved.is_empty()) {
            (Some(model), false) => {
                let prompt = grounded_prompt(&retrieved.join("\n"), &case.question);
                let request = ChatRequest::new(vec![ConversationTurn::user(prompt)]);
                model.invoke(request).await?.text
            }
            _ => case.reference_answer.clone(),
        };
        let answer_embedding = self.embedding.embed(&answer).await?;

        Ok(CaseOutcome {
            question: case.question.clone(),
            scores: MetricScores {
                context_recall: context_recall(&retrieved, &case.reference_contexts),
                context_precision: context_precision(&retrieved, &case.reference_contexts),
                faithfulness: faithfulness(&answer, &retrieved),
                answer_relevancy: answer_relevancy(&question_embedding, &answer_embedding),
            },
        })
    }
}
