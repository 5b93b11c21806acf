//! The retrieval backend contract.

use async_trait::async_trait;

use crate::error::{Result, RetrievalError};
use crate::types::{RetrievedResult, SearchQuery};

/// A search backend returning the top-k most relevant stored passages.
///
/// Implementations must:
/// - return at most `k` results ordered by descending relevance,
/// - return `Ok(vec![])` for an empty result set, never an error,
/// - fail with [`RetrievalError::InvalidArgument`] when `k == 0`.
///
/// Tie order between equally scored results is backend-native and callers
/// must not depend on it.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name, used for fan-out result grouping and logs.
    fn name(&self) -> &str;

    /// Retrieve the top `k` passages for the query.
    async fn retrieve(&self, query: &SearchQuery, k: usize) -> Result<Vec<RetrievedResult>>;
}

/// Reject `k == 0` before touching the backend.
pub(crate) fn ensure_top_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(RetrievalError::InvalidArgument("top_k must be greater than zero".into()));
    }
    Ok(())
}
