//! Retrieval-augmented question answering.
//!
//! This module provides:
//! - `Chunker`: fixed-size overlapping windows over extracted text
//! - `VectorStore`: segment persistence with SQLite and pgvector backends
//! - `Ingestor`: the offline chunk → embed → store run
//! - `RagPipeline`: the online retrieve → prompt → generate flow

pub mod chunker;
pub mod distance;
pub mod evaluation;
pub mod ingest;
pub mod pgvector;
pub mod pipeline;
pub mod preprocess;
pub mod prompt;
pub mod retriever;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

pub use chunker::{Chunker, ChunkingConfig};
pub use distance::DistanceMetric;
pub use ingest::{IngestReport, Ingestor};
pub use pgvector::PgVectorStore;
pub use pipeline::{AskFailure, AskOutcome, RagPipeline, GENERATION_ERROR_ANSWER};
pub use retriever::Retriever;
pub use sqlite::SqliteVectorStore;
pub use store::{RetrievedSegment, Segment, VectorStore};

use crate::core::config::{AppConfig, StoreBackend};
use crate::core::errors::RagError;

/// Open the backend selected by `config.database.backend`.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>, RagError> {
    let metric = config.embedding.metric;
    match config.database.backend {
        StoreBackend::Sqlite => {
            let path = config.database.sqlite_path.clone().ok_or_else(|| {
                RagError::Configuration("sqlite_path is not set".to_string())
            })?;
            tracing::info!("Opening SQLite vector store at {}", path.display());
            let store =
                SqliteVectorStore::open(&path, metric, config.database.max_connections).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            tracing::info!(
                "Connecting to pgvector store at {}:{}/{}",
                config.database.host,
                config.database.port,
                config.database.name
            );
            let store = PgVectorStore::connect(&config.database, metric).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Chunker built from the configured chunking settings.
pub fn chunker_from_config(config: &AppConfig) -> Result<Chunker, RagError> {
    let chunking = ChunkingConfig::new(config.chunking.chunk_size, config.chunking.overlap)?;
    Ok(Chunker::new(chunking))
}
