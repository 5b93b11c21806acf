//! Property tests for in-memory search ordering.

use proptest::prelude::*;
use ragkit_retrieval::{DocumentChunk, InMemoryIndex, Metadata, Retriever, SearchQuery};

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

fn arb_chunk(dim: usize) -> impl Strategy<Value = DocumentChunk> {
    ("[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(|(content, embedding)| {
        DocumentChunk { content, metadata: Metadata::new(), embedding }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of indexed chunks and any query embedding, results come
    /// back ordered by descending cosine score and never exceed `k` or the
    /// number of indexed chunks.
    #[test]
    fn results_ordered_descending_and_bounded_by_k(
        chunks in proptest::collection::vec(arb_chunk(16), 1..20),
        query in arb_normalized_embedding(16),
        k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, indexed) = rt.block_on(async {
            let index = InMemoryIndex::new(16);
            let indexed = chunks.len();
            index.add_chunks(chunks).await.unwrap();
            let query = SearchQuery::new("query", query);
            (index.retrieve(&query, k).await.unwrap(), indexed)
        });

        prop_assert!(results.len() <= k);
        prop_assert!(results.len() <= indexed);

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }
}
