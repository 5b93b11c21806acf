//! Managed knowledge-base retrieval backend.
//!
//! A [`KnowledgeBaseRetriever`] issues one retrieval call per configured
//! knowledge-base identifier through a [`KnowledgeBaseClient`] and merges the
//! results. A failing identifier only loses its own results; the merged set
//! from the remaining identifiers is still returned, and an all-fail query
//! yields an empty result set rather than an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, RetrievalError};
use crate::registry::KbEntry;
use crate::retriever::{ensure_top_k, Retriever};
use crate::types::{Metadata, RetrievedResult, SearchQuery};

/// A client for one managed retrieval service call.
///
/// The service is pre-indexed and addressed by opaque knowledge-base
/// identifier; queries are text, not vectors.
#[async_trait]
pub trait KnowledgeBaseClient: Send + Sync {
    /// Retrieve up to `top_k` passages for `query_text` from one knowledge base.
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedResult>>;
}

/// A [`Retriever`] that fans a query across several knowledge-base
/// identifiers and merges the results by descending score.
pub struct KnowledgeBaseRetriever {
    client: Arc<dyn KnowledgeBaseClient>,
    kb_ids: Vec<String>,
}

impl KnowledgeBaseRetriever {
    /// Create a retriever over the given knowledge-base identifiers.
    pub fn new(client: Arc<dyn KnowledgeBaseClient>, kb_ids: Vec<String>) -> Self {
        Self { client, kb_ids }
    }

    /// Create a retriever over every entry of a loaded registry.
    pub fn from_entries(client: Arc<dyn KnowledgeBaseClient>, entries: &[KbEntry]) -> Self {
        let kb_ids = entries.iter().map(|entry| entry.kb_id.clone()).collect();
        Self::new(client, kb_ids)
    }
}

#[async_trait]
impl Retriever for KnowledgeBaseRetriever {
    fn name(&self) -> &str {
        "knowledge-base"
    }

    async fn retrieve(&self, query: &SearchQuery, k: usize) -> Result<Vec<RetrievedResult>> {
        ensure_top_k(k)?;

        let mut merged: Vec<RetrievedResult> = Vec::new();
        for kb_id in &self.kb_ids {
            if kb_id.is_empty() {
                continue;
            }
            match self.client.retrieve(kb_id, &query.text, k).await {
                Ok(results) => merged.extend(results),
                Err(e) => {
                    // Partial failure: this identifier's results are omitted,
                    // the rest of the merge continues.
                    warn!(backend = "knowledge-base", kb_id = %kb_id, error = %e, "retrieval failed");
                }
            }
        }

        merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        merged.truncate(k);
        debug!(backend = "knowledge-base", count = merged.len(), "merged retrieval results");
        Ok(merged)
    }
}

// ── HTTP client ────────────────────────────────────────────────────

/// A [`KnowledgeBaseClient`] over the managed service's REST retrieve
/// endpoint (`POST {base_url}/knowledgebases/{kb_id}/retrieve`).
pub struct HttpKnowledgeBaseClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpKnowledgeBaseClient {
    /// Create a client for the given service base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), api_token: None }
    }

    /// Attach a bearer token to every request.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    retrieval_query: RetrievalQuery<'a>,
    retrieval_configuration: RetrievalConfiguration,
}

#[derive(Serialize)]
struct RetrievalQuery<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration {
    vector_search_configuration: VectorSearchConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration {
    number_of_results: usize,
    override_search_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<RetrievalResultRow>,
}

#[derive(Deserialize)]
struct RetrievalResultRow {
    #[serde(default)]
    content: RetrievalContent,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    score: f32,
}

#[derive(Deserialize, Default)]
struct RetrievalContent {
    #[serde(default)]
    text: String,
}

impl RetrieveResponse {
    fn into_results(self) -> Vec<RetrievedResult> {
        self.retrieval_results
            .into_iter()
            .filter(|row| !row.content.text.is_empty())
            .map(|row| RetrievedResult {
                content: row.content.text,
                metadata: row.metadata,
                score: row.score,
            })
            .collect()
    }
}

#[async_trait]
impl KnowledgeBaseClient for HttpKnowledgeBaseClient {
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedResult>> {
        let url = format!(
            "{}/knowledgebases/{}/retrieve",
            self.base_url.trim_end_matches('/'),
            knowledge_base_id
        );

        let body = RetrieveRequest {
            retrieval_query: RetrievalQuery { text: query_text },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: top_k,
                    override_search_type: "SEMANTIC",
                },
            },
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RetrievalError::Backend {
            backend: "knowledge-base".into(),
            message: format!("request to {knowledge_base_id} failed: {e}"),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RetrievalError::Backend {
                backend: "knowledge-base".into(),
                message: format!("{knowledge_base_id} returned {status}"),
            });
        }

        let envelope: RetrieveResponse =
            response.json().await.map_err(|e| RetrievalError::Backend {
                backend: "knowledge-base".into(),
                message: format!("failed to parse retrieve response: {e}"),
            })?;

        Ok(envelope.into_results())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_retrieve_response_envelope() {
        let body = json!({
            "retrievalResults": [
                {
                    "content": {"text": "조기졸업 요건: 평량평균이 3.75 이상"},
                    "metadata": {"page": 12, "filename": "univ-data.pdf"},
                    "score": 0.82,
                    "location": {"type": "S3", "s3Location": {"uri": "s3://docs/univ-data.pdf"}}
                },
                {
                    "content": {"text": ""},
                    "score": 0.1
                }
            ]
        });

        let envelope: RetrieveResponse = serde_json::from_value(body).unwrap();
        let results = envelope.into_results();
        // The empty-content row is dropped.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.82);
        assert_eq!(results[0].metadata.get("page"), Some(&json!(12)));
    }

    #[test]
    fn parse_empty_retrieve_response() {
        let envelope: RetrieveResponse = serde_json::from_value(json!({})).unwrap();
        assert!(envelope.into_results().is_empty());
    }

    struct ScriptedClient;

    #[async_trait]
    impl KnowledgeBaseClient for ScriptedClient {
        async fn retrieve(
            &self,
            knowledge_base_id: &str,
            _query_text: &str,
            _top_k: usize,
        ) -> Result<Vec<RetrievedResult>> {
            match knowledge_base_id {
                "kb-good" => Ok(vec![RetrievedResult {
                    content: "good passage".into(),
                    metadata: Metadata::new(),
                    score: 0.9,
                }]),
                "kb-low" => Ok(vec![RetrievedResult {
                    content: "low passage".into(),
                    metadata: Metadata::new(),
                    score: 0.2,
                }]),
                _ => Err(RetrievalError::Backend {
                    backend: "knowledge-base".into(),
                    message: "boom".into(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn failing_identifier_is_omitted_from_merge() {
        let retriever = KnowledgeBaseRetriever::new(
            Arc::new(ScriptedClient),
            vec!["kb-low".into(), "kb-broken".into(), "".into(), "kb-good".into()],
        );
        let query = SearchQuery::new("질문", vec![]);
        let results = retriever.retrieve(&query, 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "good passage");
        assert_eq!(results[1].content, "low passage");
    }

    #[tokio::test]
    async fn all_identifiers_failing_yields_empty_not_error() {
        let retriever = KnowledgeBaseRetriever::new(
            Arc::new(ScriptedClient),
            vec!["kb-broken".into(), "kb-dead".into()],
        );
        let query = SearchQuery::new("질문", vec![]);
        assert_eq!(retriever.retrieve(&query, 3).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn merged_results_are_truncated_to_k() {
        let retriever = KnowledgeBaseRetriever::new(
            Arc::new(ScriptedClient),
            vec!["kb-good".into(), "kb-low".into()],
        );
        let query = SearchQuery::new("질문", vec![]);
        let results = retriever.retrieve(&query, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "good passage");
    }
}
