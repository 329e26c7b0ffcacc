//! Offline ingestion: chunk, embed with the document intent, replace the
//! store contents in one batch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::chunker::Chunker;
use super::preprocess::clean_text;
use super::store::{check_dimension, Segment, VectorStore};
use crate::core::errors::RagError;
use crate::llm::{EmbeddingClient, EmbeddingIntent};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub chunk_count: usize,
    pub stored: usize,
    /// Sequence indices of chunks whose embedding failed.
    pub skipped: Vec<usize>,
}

pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
}

impl Ingestor {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
        }
    }

    /// Normalize extracted document text, then ingest it.
    pub async fn ingest_document(&self, raw_text: &str) -> Result<IngestReport, RagError> {
        self.ingest(&clean_text(raw_text)).await
    }

    /// Replace the store contents with the chunks of `text`.
    ///
    /// Chunks whose embedding fails are logged and skipped. Configuration
    /// and store errors abort the run. Previous contents are only dropped
    /// once every chunk has been embedded.
    pub async fn ingest(&self, text: &str) -> Result<IngestReport, RagError> {
        let chunks = self.chunker.chunk(text);
        let chunk_count = chunks.len();
        tracing::info!(
            "Chunked {} chars into {} chunk(s) (size={}, overlap={})",
            text.chars().count(),
            chunk_count,
            self.chunker.config().chunk_size(),
            self.chunker.config().overlap()
        );

        let mut segments = Vec::with_capacity(chunk_count);
        let mut skipped = Vec::new();

        for (sequence_index, chunk) in chunks.into_iter().enumerate() {
            match self.embedder.embed(&chunk, EmbeddingIntent::Document).await {
                Ok(embedding) => {
                    check_dimension(
                        self.embedder.dimension(),
                        embedding.len(),
                        &format!("embedding of chunk {}", sequence_index),
                    )?;
                    segments.push(Segment {
                        sequence_index,
                        text: chunk,
                        embedding,
                    });
                }
                Err(RagError::Embedding(reason)) => {
                    tracing::warn!("Skipping chunk {}: {}", sequence_index, reason);
                    skipped.push(sequence_index);
                }
                Err(err) => return Err(err),
            }
        }

        self.store.recreate_schema(self.embedder.dimension()).await?;
        let stored = segments.len();
        self.store.insert_batch(segments).await?;

        if skipped.is_empty() {
            tracing::info!("Stored {} segment(s)", stored);
        } else {
            tracing::warn!(
                "Stored {} of {} segment(s); skipped {:?}",
                stored,
                chunk_count,
                skipped
            );
        }

        Ok(IngestReport {
            chunk_count,
            stored,
            skipped,
        })
    }
}
