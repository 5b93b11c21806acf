//! # ragkit-retrieval
//!
//! Vector search backends for the ragkit answering engine.
//!
//! All backends implement the single [`Retriever`] contract:
//! `retrieve(&SearchQuery, k)` returns at most `k` results ordered by
//! descending relevance, never failing on an empty result set.
//!
//! Three interchangeable variants:
//! - [`InMemoryIndex`] — exact cosine search over chunks held in memory.
//! - `PgVectorRetriever` (feature `pgvector`) — one ranking query against a
//!   Postgres table with a pgvector column.
//! - [`KnowledgeBaseRetriever`] — one call per registered knowledge-base
//!   identifier through a [`KnowledgeBaseClient`], tolerating partial failure.
//!
//! [`fan_out`] queries several backends concurrently with per-backend
//! independent failure, and [`KbRegistry`] persists the knowledge-base
//! identifier registry file.

pub mod catalog;
pub mod error;
pub mod fanout;
pub mod inmemory;
pub mod knowledge_base;
#[cfg(feature = "pgvector")]
pub mod pgvector;
pub mod registry;
pub mod retriever;
pub mod types;

pub use catalog::{DocumentCatalog, DocumentInfo};
pub use error::{Result, RetrievalError};
pub use fanout::{fan_out, BackendFailure, BackendResults, FanOut};
pub use inmemory::InMemoryIndex;
pub use knowledge_base::{HttpKnowledgeBaseClient, KnowledgeBaseClient, KnowledgeBaseRetriever};
#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorRetriever;
pub use registry::{KbEntry, KbRegistry};
pub use retriever::Retriever;
pub use types::{DocumentChunk, Metadata, RetrievedResult, SearchQuery};
