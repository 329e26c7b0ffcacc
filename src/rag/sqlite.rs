//! SQLite-backed vector store.
//!
//! In-process store using SQLite for the segment rows and brute-force
//! distance computation for nearest-neighbor search.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::distance::{compare_distance, DistanceMetric};
use super::store::{check_dimension, RetrievedSegment, Segment, VectorStore};
use crate::core::errors::RagError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    metric: DistanceMetric,
}

impl SqliteVectorStore {
    pub async fn open(
        db_path: impl AsRef<Path>,
        metric: DistanceMetric,
        max_connections: u32,
    ) -> Result<Self, RagError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                RagError::Store(format!(
                    "failed to create database directory {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(RagError::store)?;

        let store = Self { pool, metric };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), RagError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        sqlx::query(SEGMENTS_DDL)
            .execute(&self.pool)
            .await
            .map_err(RagError::store)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

const SEGMENTS_DDL: &str = "CREATE TABLE IF NOT EXISTS segments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sequence_index INTEGER NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn recreate_schema(&self, dimension: usize) -> Result<(), RagError> {
        if dimension == 0 {
            return Err(RagError::Configuration(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(RagError::store)?;

        sqlx::query("DROP TABLE IF EXISTS segments")
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;
        sqlx::query(SEGMENTS_DDL)
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;
        sqlx::query(
            "INSERT OR REPLACE INTO rag_meta (key, value, updated_at)
             VALUES ('dimension', ?1, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        )
        .bind(dimension.to_string())
        .execute(&mut *tx)
        .await
        .map_err(RagError::store)?;

        tx.commit().await.map_err(RagError::store)?;
        Ok(())
    }

    async fn insert_batch(&self, segments: Vec<Segment>) -> Result<(), RagError> {
        if segments.is_empty() {
            return Ok(());
        }

        let dimension = self.dimension().await?.ok_or_else(|| {
            RagError::Store("segments schema has not been created".to_string())
        })?;
        for segment in &segments {
            check_dimension(
                dimension,
                segment.embedding.len(),
                &format!("segment {}", segment.sequence_index),
            )?;
        }

        // dropped without commit on any error, which rolls back
        let mut tx = self.pool.begin().await.map_err(RagError::store)?;

        for segment in &segments {
            sqlx::query(
                "INSERT INTO segments (sequence_index, text, embedding) VALUES (?1, ?2, ?3)",
            )
            .bind(segment.sequence_index as i64)
            .bind(&segment.text)
            .bind(Self::serialize_embedding(&segment.embedding))
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;
        }

        tx.commit().await.map_err(RagError::store)?;
        Ok(())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedSegment>, RagError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if let Some(dimension) = self.dimension().await? {
            check_dimension(dimension, query.len(), "query vector")?;
        }

        let rows = sqlx::query("SELECT sequence_index, text, embedding FROM segments")
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::store)?;

        let mut scored: Vec<RetrievedSegment> = rows
            .iter()
            .map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let sequence_index: i64 = row.get("sequence_index");
                RetrievedSegment {
                    sequence_index: sequence_index as usize,
                    text: row.get("text"),
                    distance: self.metric.distance(query, &stored),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            compare_distance(a.distance, b.distance)
                .then_with(|| a.sequence_index.cmp(&b.sequence_index))
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, RagError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM segments")
            .fetch_one(&self.pool)
            .await
            .map_err(RagError::store)?;
        Ok(count as usize)
    }

    async fn dimension(&self) -> Result<Option<usize>, RagError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM rag_meta WHERE key = 'dimension'")
                .fetch_optional(&self.pool)
                .await
                .map_err(RagError::store)?;

        value
            .map(|raw| {
                raw.parse::<usize>().map_err(|err| {
                    RagError::Store(format!("corrupt dimension metadata {:?}: {}", raw, err))
                })
            })
            .transpose()
    }
}
