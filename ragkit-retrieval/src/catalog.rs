//! Document catalog: what has been ingested into a backend.
//!
//! Chunk metadata carries `filename` and `document_file_id` fields from
//! ingestion; the catalog groups chunks back into per-document rows for the
//! `/api/documents` listing.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::inmemory::InMemoryIndex;

/// One ingested document, summarized from its chunks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    /// Numeric document identifier, when ingestion recorded one.
    pub id: Option<i64>,
    /// Document title (source filename), `"Untitled"` when unknown.
    pub title: String,
    /// Number of chunks the document was split into.
    pub chunk_count: u64,
    /// Latest ingestion timestamp (ISO 8601 text), when the backend stores one.
    pub created_at: Option<String>,
}

/// Lists the documents a retrieval backend holds.
#[async_trait]
pub trait DocumentCatalog: Send + Sync {
    /// Summarize ingested documents, most recent first where known.
    async fn list_documents(&self) -> Result<Vec<DocumentInfo>>;
}

fn metadata_str(metadata: &crate::types::Metadata, key: &str) -> Option<String> {
    metadata.get(key).and_then(|value| match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

#[async_trait]
impl DocumentCatalog for InMemoryIndex {
    async fn list_documents(&self) -> Result<Vec<DocumentInfo>> {
        use std::collections::BTreeMap;

        let mut grouped: BTreeMap<(String, Option<i64>), u64> = BTreeMap::new();
        for chunk in self.snapshot().await {
            let title = metadata_str(&chunk.metadata, "filename")
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let id = metadata_str(&chunk.metadata, "document_file_id")
                .and_then(|raw| raw.trim().parse::<i64>().ok());
            *grouped.entry((title, id)).or_default() += 1;
        }

        Ok(grouped
            .into_iter()
            .map(|((title, id), chunk_count)| DocumentInfo {
                id,
                title,
                chunk_count,
                created_at: None,
            })
            .collect())
    }
}

#[cfg(feature = "pgvector")]
mod pg {
    use sqlx::Row;
    use tracing::error;

    use super::*;
    use crate::pgvector::PgVectorRetriever;

    #[async_trait]
    impl DocumentCatalog for PgVectorRetriever {
        async fn list_documents(&self) -> Result<Vec<DocumentInfo>> {
            let sql = "SELECT metadata->>'filename' AS filename, \
                              metadata->>'document_file_id' AS document_file_id, \
                              COUNT(*) AS chunk_count, \
                              MAX(created_at)::text AS latest_created_at \
                       FROM documents \
                       GROUP BY metadata->>'filename', metadata->>'document_file_id' \
                       ORDER BY MAX(created_at) DESC";

            let rows = match sqlx::query(sql).fetch_all(self.pool()).await {
                Ok(rows) => rows,
                Err(e) => {
                    error!(backend = "pgvector", error = %e, "document listing failed");
                    return Ok(Vec::new());
                }
            };

            Ok(rows
                .iter()
                .map(|row| {
                    let filename: Option<String> = row.get("filename");
                    let raw_id: Option<String> = row.get("document_file_id");
                    let chunk_count: i64 = row.get("chunk_count");
                    let created_at: Option<String> = row.get("latest_created_at");
                    DocumentInfo {
                        id: raw_id.and_then(|raw| raw.trim().parse::<i64>().ok()),
                        title: filename
                            .filter(|title| !title.trim().is_empty())
                            .unwrap_or_else(|| "Untitled".to_string()),
                        chunk_count: chunk_count.max(0) as u64,
                        created_at,
                    }
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentChunk;
    use serde_json::json;

    fn chunk(filename: Option<&str>, file_id: Option<&str>) -> DocumentChunk {
        let mut metadata = crate::types::Metadata::new();
        if let Some(filename) = filename {
            metadata.insert("filename".into(), json!(filename));
        }
        if let Some(file_id) = file_id {
            metadata.insert("document_file_id".into(), json!(file_id));
        }
        DocumentChunk { content: "text".into(), metadata, embedding: vec![0.0, 1.0] }
    }

    #[tokio::test]
    async fn chunks_are_grouped_into_documents() {
        let index = InMemoryIndex::new(2);
        index
            .add_chunks(vec![
                chunk(Some("univ-data.pdf"), Some("7")),
                chunk(Some("univ-data.pdf"), Some("7")),
                chunk(Some("handbook.pdf"), Some("not-a-number")),
                chunk(None, None),
            ])
            .await
            .unwrap();

        let documents = index.list_documents().await.unwrap();
        assert_eq!(documents.len(), 3);

        let univ = documents.iter().find(|doc| doc.title == "univ-data.pdf").unwrap();
        assert_eq!(univ.chunk_count, 2);
        assert_eq!(univ.id, Some(7));

        let handbook = documents.iter().find(|doc| doc.title == "handbook.pdf").unwrap();
        assert_eq!(handbook.id, None);

        assert!(documents.iter().any(|doc| doc.title == "Untitled"));
    }
}
