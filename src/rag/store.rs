//! VectorStore trait: the storage seam for embedded segments.
//!
//! Backends persist `(sequence_index, text, embedding)` triples and answer
//! nearest-neighbor queries ordered by ascending distance. Two backends
//! ship with the crate: `SqliteVectorStore` (local, brute force) and
//! `PgVectorStore` (Postgres with the pgvector extension).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

/// A chunk of the source document together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Creation order of the chunk; not a content identity.
    pub sequence_index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSegment {
    pub sequence_index: usize,
    pub text: String,
    /// Lower is closer.
    pub distance: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drop all stored segments and recreate the schema for vectors of
    /// `dimension` components.
    async fn recreate_schema(&self, dimension: usize) -> Result<(), RagError>;

    /// Persist segments in a single transaction. Either all rows land or
    /// none do.
    async fn insert_batch(&self, segments: Vec<Segment>) -> Result<(), RagError>;

    /// The `k` stored segments closest to `query`, ascending by distance.
    /// Ties are broken by ascending `sequence_index`.
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedSegment>, RagError>;

    async fn count(&self) -> Result<usize, RagError>;

    /// Dimension declared by the current schema, if one exists.
    async fn dimension(&self) -> Result<Option<usize>, RagError>;
}

/// Fails with `Configuration` when a vector does not match the schema.
pub fn check_dimension(expected: usize, actual: usize, what: &str) -> Result<(), RagError> {
    if expected != actual {
        return Err(RagError::Configuration(format!(
            "{} has dimension {}, schema declares {}",
            what, actual, expected
        )));
    }
    Ok(())
}
