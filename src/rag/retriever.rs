use std::sync::Arc;

use super::store::{RetrievedSegment, VectorStore};
use crate::core::errors::RagError;
use crate::llm::{EmbeddingClient, EmbeddingIntent};

/// Query-time half of the pipeline: query embedding plus nearest-neighbor
/// search.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Up to `top_k` stored segments, ascending by distance, exactly as the
    /// store ranked them. An embedding failure fails the whole call.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedSegment>, RagError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query, EmbeddingIntent::Query).await?;
        let results = self.store.nearest(&query_embedding, top_k).await?;

        tracing::debug!(
            "Retrieved {} segment(s) for query ({} chars)",
            results.len(),
            query.chars().count()
        );
        Ok(results)
    }
}
