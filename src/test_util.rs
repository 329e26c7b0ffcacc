//! Shared fixtures for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use crate::core::errors::RagError;
use crate::llm::{AnswerGenerator, EmbeddingClient, EmbeddingIntent};
use crate::rag::{DistanceMetric, SqliteVectorStore};

/// A fresh SQLite store in the system temp directory.
pub async fn temp_sqlite_store(metric: DistanceMetric) -> SqliteVectorStore {
    let tmp = std::env::temp_dir().join(format!("rag-qa-test-{}.db", uuid::Uuid::new_v4()));
    SqliteVectorStore::open(tmp, metric, 2).await.unwrap()
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_mock_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// Mock `generateContent` endpoint at `/gen` that answers only after
/// three seconds.
pub fn slow_generation_router() -> Router {
    Router::new().route(
        "/gen",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"candidates": [{"content": {"parts": [{"text": "late"}]}}]}))
        }),
    )
}

/// Embedder with canned vectors. Unknown texts get a vector of ones.
pub struct StaticEmbedder {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    failures: HashSet<String>,
    calls: Mutex<Vec<(String, EmbeddingIntent)>>,
}

impl StaticEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            failures: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failures.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, EmbeddingIntent)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingClient for StaticEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, RagError> {
        self.calls.lock().unwrap().push((text.to_string(), intent));
        if text.trim().is_empty() {
            return Err(RagError::Embedding("cannot embed empty text".to_string()));
        }
        if self.failures.contains(text) {
            return Err(RagError::Embedding(format!("injected failure for {:?}", text)));
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![1.0; self.dimension]))
    }
}

/// Generator that records prompts and replies with a fixed result.
pub struct RecordingGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(RagError::Generation)
    }
}
