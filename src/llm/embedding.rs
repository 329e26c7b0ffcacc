use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{Content, EmbedContentRequest, EmbedContentResponse, EmbeddingIntent};
use crate::core::config::GeminiConfig;
use crate::core::errors::RagError;
use crate::rag::store::check_dimension;

#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Dimension every returned vector must have.
    fn dimension(&self) -> usize;

    /// Embed `text` for the given intent.
    ///
    /// Fails with `Embedding` on transport errors, non-2xx responses,
    /// malformed bodies and empty input, and with `Configuration` when the
    /// returned vector does not have `dimension()` components.
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, RagError>;
}

#[derive(Clone)]
pub struct GeminiEmbeddingClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    dimension: usize,
}

impl GeminiEmbeddingClient {
    pub fn new(config: &GeminiConfig, dimension: usize) -> Result<Self, RagError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RagError::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| RagError::Configuration(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.embedding_url.clone(),
            model: config.embedding_model.clone(),
            api_key,
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingClient for GeminiEmbeddingClient {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, RagError> {
        if text.trim().is_empty() {
            return Err(RagError::Embedding("cannot embed empty text".to_string()));
        }

        let body = EmbedContentRequest {
            model: self.model.clone(),
            content: Content::from_text(text),
            task_type: intent.task_type(),
            output_dimensionality: self.dimension,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let detail = res.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "Gemini embedding API returned {}: {}",
                status, detail
            )));
        }

        let payload: EmbedContentResponse = res.json().await.map_err(|err| {
            RagError::Embedding(format!("malformed embedding response: {}", err))
        })?;

        let values = payload.embedding.values;
        check_dimension(self.dimension, values.len(), "embedding service vector")?;
        Ok(values)
    }
}
