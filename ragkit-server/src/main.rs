//! Server binary: environment-configured wiring of the answering engine.
//!
//! Environment:
//! - `ANTHROPIC_API_KEY` — required, chat model credentials.
//! - `OPENAI_API_KEY` — required, embedding credentials.
//! - `DATABASE_URL` — optional; set selects the pgvector backend, unset
//!   falls back to an empty in-memory index (useful for smoke testing).
//! - `RAGKIT_BIND` — optional listen address, default `0.0.0.0:8000`.
//! - `RUST_LOG` — tracing filter, default `info`.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ragkit_core::EmbeddingProvider;
use ragkit_engine::AnswerEngine;
use ragkit_model::{AnthropicChatModel, OpenAIEmbeddingProvider};
use ragkit_retrieval::{DocumentCatalog, InMemoryIndex, PgVectorRetriever, Retriever};
use ragkit_server::{build_router, AppState};
use ragkit_session::{InMemorySessionStore, RetentionPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let model =
        Arc::new(AnthropicChatModel::from_env().context("chat model configuration")?);
    let embedding = Arc::new(
        OpenAIEmbeddingProvider::from_env().context("embedding provider configuration")?,
    );

    let (retriever, catalog): (Arc<dyn Retriever>, Arc<dyn DocumentCatalog>) =
        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                let pg = Arc::new(
                    PgVectorRetriever::connect(&url)
                        .await
                        .context("connecting to Postgres")?,
                );
                info!("using pgvector retrieval backend");
                (pg.clone() as Arc<dyn Retriever>, pg as Arc<dyn DocumentCatalog>)
            }
            Err(_) => {
                warn!("DATABASE_URL not set, starting with an empty in-memory index");
                let index = Arc::new(InMemoryIndex::new(embedding.dimensions()));
                (index.clone() as Arc<dyn Retriever>, index as Arc<dyn DocumentCatalog>)
            }
        };

    let store = Arc::new(InMemorySessionStore::new(RetentionPolicy::Window(20)));
    let engine = Arc::new(
        AnswerEngine::builder()
            .embedding(embedding)
            .model(model)
            .store(store)
            .retriever(retriever)
            .build()?,
    );

    let app = build_router(AppState { engine, catalog });
    let bind = std::env::var("RAGKIT_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(%bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
