//! Retrieval backend for PostgreSQL with the pgvector extension.
//!
//! Issues a single ranking query (`ORDER BY embedding <=> $1::vector LIMIT k`)
//! against a `documents` table. Connection and query failures are caught,
//! logged, and surfaced as an empty result set rather than crashing the
//! caller.
//!
//! # Prerequisites
//!
//! - PostgreSQL with the `pgvector` extension created
//! - A table `documents(content TEXT, embedding vector(D), metadata JSONB)`

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, error};

use crate::error::Result;
use crate::retriever::{ensure_top_k, Retriever};
use crate::types::{Metadata, RetrievedResult, SearchQuery};

/// A [`Retriever`] backed by a Postgres `documents` table with a pgvector
/// embedding column.
pub struct PgVectorRetriever {
    pool: PgPool,
}

impl PgVectorRetriever {
    /// Connect to the given database URL with a small connection pool.
    pub async fn connect(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(5).connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing connection pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool (shared with the document catalog).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Render an embedding as the pgvector text literal `[v1,v2,...]`.
    fn embedding_literal(embedding: &[f32]) -> String {
        format!("[{}]", embedding.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
    }
}

fn parse_metadata(raw: Option<String>) -> Metadata {
    raw.and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|value| match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

#[async_trait]
impl Retriever for PgVectorRetriever {
    fn name(&self) -> &str {
        "pgvector"
    }

    async fn retrieve(&self, query: &SearchQuery, k: usize) -> Result<Vec<RetrievedResult>> {
        ensure_top_k(k)?;

        // Cosine distance operator <=> returns 0 for identical vectors,
        // so score = 1 - distance.
        let sql = "SELECT content, metadata::text AS metadata, \
                          1 - (embedding <=> $1::vector) AS score \
                   FROM documents \
                   ORDER BY embedding <=> $1::vector \
                   LIMIT $2";

        let rows = sqlx::query(sql)
            .bind(Self::embedding_literal(&query.embedding))
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await;

        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => {
                // A dead connection must not take the whole request down;
                // the caller sees an empty result and the cause is logged.
                error!(backend = "pgvector", error = %e, "ranking query failed");
                return Ok(Vec::new());
            }
        };

        let results: Vec<RetrievedResult> = rows
            .iter()
            .map(|row| {
                let content: String = row.get("content");
                let metadata: Option<String> = row.get("metadata");
                let score: f64 = row.get("score");
                RetrievedResult {
                    content,
                    metadata: parse_metadata(metadata),
                    score: score as f32,
                }
            })
            .collect();

        debug!(backend = "pgvector", count = results.len(), "retrieved chunks");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_literal_matches_pgvector_format() {
        assert_eq!(PgVectorRetriever::embedding_literal(&[1.0, -0.5, 0.25]), "[1,-0.5,0.25]");
    }

    #[test]
    fn metadata_parsing_tolerates_bad_json() {
        assert!(parse_metadata(None).is_empty());
        assert!(parse_metadata(Some("not json".into())).is_empty());
        assert!(parse_metadata(Some("[1,2]".into())).is_empty());

        let map = parse_metadata(Some(r#"{"page": 3, "filename": "univ-data.pdf"}"#.into()));
        assert_eq!(map.get("page"), Some(&serde_json::json!(3)));
    }
}
