//! Embedding provider trait for converting text to fixed-length vectors.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// A provider that converts text into fixed-length embedding vectors.
///
/// The dimensionality reported by [`dimensions`](EmbeddingProvider::dimensions)
/// must match the dimensionality of every vector the provider returns;
/// similarity comparison against an index built with a different
/// dimensionality is invalid.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends with
/// native batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmptyInput`] for empty text and
    /// [`EmbeddingError::Transport`] on provider failure.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
