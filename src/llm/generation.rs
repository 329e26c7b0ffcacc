use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::core::config::GeminiConfig;
use crate::core::errors::RagError;

/// Grounded answers must be reproducible for the same prompt.
const GENERATION_TEMPERATURE: f32 = 0.0;

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Produce text for a fully built prompt.
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(config: &GeminiConfig) -> Result<Self, RagError> {
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
            endpoint: config.generation_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let body = GenerateContentRequest {
            contents: vec![Content::from_text(prompt)],
            generation_config: GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
            },
        };

        let res = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::generation)?;

        if !res.status().is_success() {
            let status = res.status();
            let detail = res.text().await.unwrap_or_default();
            return Err(RagError::Generation(format!(
                "Gemini API returned {}: {}",
                status, detail
            )));
        }

        let payload: GenerateContentResponse = res.json().await.map_err(|err| {
            RagError::Generation(format!("malformed generation response: {}", err))
        })?;

        payload
            .first_text()
            .ok_or_else(|| RagError::Generation("response contained no candidates".to_string()))
    }
}
