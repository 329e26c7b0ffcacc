//! Postgres + pgvector store.
//!
//! Distance ranking happens inside Postgres with the pgvector operators
//! (`<#>` negative inner product, `<=>` cosine distance). Vectors travel as
//! pgvector text literals (`[0.1,0.2,...]`) cast with `::vector`.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};

use super::distance::DistanceMetric;
use super::store::{check_dimension, RetrievedSegment, Segment, VectorStore};
use crate::core::config::DatabaseConfig;
use crate::core::errors::RagError;

pub struct PgVectorStore {
    pool: PgPool,
    metric: DistanceMetric,
}

impl PgVectorStore {
    pub async fn connect(config: &DatabaseConfig, metric: DistanceMetric) -> Result<Self, RagError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(RagError::store)?;

        Ok(Self { pool, metric })
    }

    fn vector_literal(values: &[f32]) -> String {
        let body = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("[{}]", body)
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn recreate_schema(&self, dimension: usize) -> Result<(), RagError> {
        if dimension == 0 {
            return Err(RagError::Configuration(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(RagError::store)?;

        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;
        sqlx::query("DROP TABLE IF EXISTS chunks")
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;
        sqlx::query(&format!(
            "CREATE TABLE chunks (
                id SERIAL PRIMARY KEY,
                chunk_id BIGINT NOT NULL,
                text TEXT NOT NULL,
                embedding vector({}) NOT NULL
            )",
            dimension
        ))
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
            RagError::Store("chunks table has not been created".to_string())
        })?;
        for segment in &segments {
            check_dimension(
                dimension,
                segment.embedding.len(),
                &format!("segment {}", segment.sequence_index),
            )?;
        }

        let mut tx = self.pool.begin().await.map_err(RagError::store)?;

        for segment in &segments {
            sqlx::query("INSERT INTO chunks (chunk_id, text, embedding) VALUES ($1, $2, $3::vector)")
                .bind(segment.sequence_index as i64)
                .bind(&segment.text)
                .bind(Self::vector_literal(&segment.embedding))
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
        let Some(dimension) = self.dimension().await? else {
            return Ok(Vec::new());
        };
        check_dimension(dimension, query.len(), "query vector")?;

        let sql = format!(
            "SELECT chunk_id, text, (embedding {op} $1::vector)::float8 AS distance
             FROM chunks
             ORDER BY distance, chunk_id
             LIMIT $2",
            op = self.metric.pg_operator()
        );

        let rows = sqlx::query(&sql)
            .bind(Self::vector_literal(query))
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::store)?;

        Ok(rows
            .iter()
            .map(|row| {
                let chunk_id: i64 = row.get("chunk_id");
                let distance: f64 = row.get("distance");
                RetrievedSegment {
                    sequence_index: chunk_id as usize,
                    text: row.get("text"),
                    distance: distance as f32,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, RagError> {
        if self.dimension().await?.is_none() {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(RagError::store)?;
        Ok(count as usize)
    }

    async fn dimension(&self) -> Result<Option<usize>, RagError> {
        // pgvector keeps the declared dimension in the column typmod
        let typmod: Option<i32> = sqlx::query_scalar(
            "SELECT atttypmod FROM pg_attribute
             WHERE attrelid = to_regclass('chunks') AND attname = 'embedding'",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(RagError::store)?;

        Ok(typmod.filter(|d| *d > 0).map(|d| d as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_matches_pgvector_text_format() {
        assert_eq!(PgVectorStore::vector_literal(&[1.0, -0.5, 2.25]), "[1,-0.5,2.25]");
        assert_eq!(PgVectorStore::vector_literal(&[]), "[]");
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_pgvector_roundtrip() {
        let mut config = DatabaseConfig::default();
        config.password = std::env::var("DB_PASS").unwrap_or_default();

        let store = PgVectorStore::connect(&config, DistanceMetric::InnerProduct)
            .await
            .expect("Postgres with pgvector must be reachable");

        store.recreate_schema(2).await.unwrap();
        store
            .insert_batch(vec![
                Segment {
                    sequence_index: 0,
                    text: "far".to_string(),
                    embedding: vec![0.1, 0.0],
                },
                Segment {
                    sequence_index: 1,
                    text: "near".to_string(),
                    embedding: vec![0.9, 0.0],
                },
            ])
            .await
            .unwrap();

        let hits = store.nearest(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "near");
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
