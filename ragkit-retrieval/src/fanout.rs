//! Concurrent retrieval across several backends.
//!
//! A single query is sent to every backend through a bounded worker pool;
//! results are collected by backend name and each task fails independently.
//! One backend's failure never cancels the others and never escapes to the
//! caller.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::error::RetrievalError;
use crate::retriever::Retriever;
use crate::types::{RetrievedResult, SearchQuery};

/// One backend's successful results.
#[derive(Debug, Clone)]
pub struct BackendResults {
    /// The backend name.
    pub backend: String,
    /// Results in the backend's relevance order.
    pub results: Vec<RetrievedResult>,
}

/// One backend's failure, recorded instead of propagated.
#[derive(Debug)]
pub struct BackendFailure {
    /// The backend name.
    pub backend: String,
    /// The error the backend produced.
    pub error: RetrievalError,
}

/// The outcome of a multi-backend retrieval.
#[derive(Debug, Default)]
pub struct FanOut {
    /// Successful backends, in completion order.
    pub results: Vec<BackendResults>,
    /// Failed backends; empty when everything succeeded.
    pub failures: Vec<BackendFailure>,
}

impl FanOut {
    /// All results from all successful backends, ordered by descending score.
    pub fn merged(&self) -> Vec<RetrievedResult> {
        let mut merged: Vec<RetrievedResult> =
            self.results.iter().flat_map(|backend| backend.results.iter().cloned()).collect();
        merged
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        merged
    }
}

/// Query every backend concurrently, at most `concurrency` in flight.
///
/// Per-backend failures are logged and collected into
/// [`FanOut::failures`]; the call itself never fails.
pub async fn fan_out(
    retrievers: &[Arc<dyn Retriever>],
    query: &SearchQuery,
    k: usize,
    concurrency: usize,
) -> FanOut {
    // Collected eagerly: feeding the lazy `map` adapter straight into
    // `buffer_unordered` trips rustc's higher-ranked lifetime inference
    // (rust-lang/rust#102211) and the caller's future loses `Send`.
    let tasks: Vec<_> = retrievers
        .iter()
        .map(|retriever| {
            let retriever = Arc::clone(retriever);
            let query = query.clone();
            async move {
                let name = retriever.name().to_string();
                let outcome = retriever.retrieve(&query, k).await;
                (name, outcome)
            }
        })
        .collect();

    let outcomes: Vec<_> =
        stream::iter(tasks).buffer_unordered(concurrency.max(1)).collect().await;

    let mut fan_out = FanOut::default();
    for (backend, outcome) in outcomes {
        match outcome {
            Ok(results) => fan_out.results.push(BackendResults { backend, results }),
            Err(error) => {
                warn!(backend = %backend, error = %error, "backend failed during fan-out");
                fan_out.failures.push(BackendFailure { backend, error });
            }
        }
    }
    fan_out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::types::Metadata;
    use async_trait::async_trait;

    struct FixedRetriever {
        name: &'static str,
        scores: Vec<f32>,
        fail: bool,
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        fn name(&self) -> &str {
            self.name
        }

        async fn retrieve(&self, _query: &SearchQuery, _k: usize) -> Result<Vec<RetrievedResult>> {
            if self.fail {
                return Err(RetrievalError::Backend {
                    backend: self.name.into(),
                    message: "simulated outage".into(),
                });
            }
            Ok(self
                .scores
                .iter()
                .map(|score| RetrievedResult {
                    content: format!("{}:{score}", self.name),
                    metadata: Metadata::new(),
                    score: *score,
                })
                .collect())
        }
    }

    fn backends() -> Vec<Arc<dyn Retriever>> {
        vec![
            Arc::new(FixedRetriever { name: "a", scores: vec![0.9, 0.3], fail: false }),
            Arc::new(FixedRetriever { name: "b", scores: vec![], fail: true }),
            Arc::new(FixedRetriever { name: "c", scores: vec![0.7], fail: false }),
        ]
    }

    #[tokio::test]
    async fn failing_backend_does_not_poison_the_others() {
        let query = SearchQuery::new("q", vec![1.0]);
        let outcome = fan_out(&backends(), &query, 3, 2).await;

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].backend, "b");

        let merged = outcome.merged();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].content, "a:0.9");
        assert_eq!(merged[1].content, "c:0.7");
        assert!(merged.iter().all(|result| !result.content.starts_with("b:")));
    }

    #[tokio::test]
    async fn all_backends_failing_yields_empty_outcome() {
        let retrievers: Vec<Arc<dyn Retriever>> = vec![
            Arc::new(FixedRetriever { name: "x", scores: vec![], fail: true }),
            Arc::new(FixedRetriever { name: "y", scores: vec![], fail: true }),
        ];
        let query = SearchQuery::new("q", vec![1.0]);
        let outcome = fan_out(&retrievers, &query, 3, 4).await;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.merged().is_empty());
    }
}
