//! In-memory retrieval backend using exact cosine similarity.
//!
//! Suitable for development, tests, and small corpora: every indexed vector
//! is compared against the query. No network failure mode.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, RetrievalError};
use crate::retriever::{ensure_top_k, Retriever};
use crate::types::{DocumentChunk, RetrievedResult, SearchQuery};

/// An in-memory index of [`DocumentChunk`]s searched by cosine similarity.
///
/// The dimensionality is fixed at construction and enforced on both ingest
/// and query; comparing vectors of different dimensionality is invalid.
#[derive(Debug)]
pub struct InMemoryIndex {
    dimensions: usize,
    chunks: RwLock<Vec<DocumentChunk>>,
}

impl InMemoryIndex {
    /// Create an empty index for embeddings of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, chunks: RwLock::new(Vec::new()) }
    }

    /// The dimensionality this index was created with.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Add chunks to the index.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidArgument`] if any chunk's embedding
    /// does not match the index dimensionality; nothing is added in that case.
    pub async fn add_chunks(&self, chunks: Vec<DocumentChunk>) -> Result<()> {
        for chunk in &chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(RetrievalError::InvalidArgument(format!(
                    "chunk embedding has {} dimensions, index expects {}",
                    chunk.embedding.len(),
                    self.dimensions
                )));
            }
        }
        let mut store = self.chunks.write().await;
        store.extend(chunks);
        Ok(())
    }

    /// Number of indexed chunks.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    /// Whether the index holds no chunks.
    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    /// Snapshot of all indexed chunks (used by the document catalog).
    pub(crate) async fn snapshot(&self) -> Vec<DocumentChunk> {
        self.chunks.read().await.clone()
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 if either is zero.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl Retriever for InMemoryIndex {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn retrieve(&self, query: &SearchQuery, k: usize) -> Result<Vec<RetrievedResult>> {
        ensure_top_k(k)?;
        if query.embedding.len() != self.dimensions {
            return Err(RetrievalError::InvalidArgument(format!(
                "query embedding has {} dimensions, index expects {}",
                query.embedding.len(),
                self.dimensions
            )));
        }

        let store = self.chunks.read().await;
        let mut scored: Vec<RetrievedResult> = store
            .iter()
            .map(|chunk| RetrievedResult {
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                score: cosine_similarity(&chunk.embedding, &query.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}
