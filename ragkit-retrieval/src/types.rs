//! Data types for stored chunks, queries, and retrieval results.

use serde::{Deserialize, Serialize};

/// Free-form chunk metadata (page numbers, source filenames, etc.).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored passage with its embedding, created at ingestion time and
/// immutable thereafter. Owned exclusively by the backend that indexed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// The passage text.
    pub content: String,
    /// Key-value metadata attached at ingestion.
    #[serde(default)]
    pub metadata: Metadata,
    /// The passage's embedding vector.
    pub embedding: Vec<f32>,
}

/// A retrieved passage paired with a relevance score.
///
/// Lives for a single request; echoed back to callers as a "source".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedResult {
    /// The passage text.
    pub content: String,
    /// Metadata copied from the stored chunk.
    #[serde(default)]
    pub metadata: Metadata,
    /// Relevance score, higher is more relevant. Cosine-based backends stay
    /// in [-1, 1]; managed backends report their native relevance.
    pub score: f32,
}

/// A query prepared for retrieval: the raw text plus its embedding.
///
/// The embedding is computed once by the caller and shared across backends;
/// vector backends search by embedding, the managed backend by text.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// The user's query text.
    pub text: String,
    /// The query embedding. Dimensionality must match the indexed chunks.
    pub embedding: Vec<f32>,
}

impl SearchQuery {
    /// Create a search query from text and its embedding.
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self { text: text.into(), embedding }
    }
}
