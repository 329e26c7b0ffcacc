use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::core::errors::RagError;
use crate::llm::{AnswerGenerator, EmbeddingClient, GeminiEmbeddingClient, GeminiGenerator};
use crate::memory::ShortTermMemory;
use crate::rag::{self, Ingestor, RagPipeline, Retriever, VectorStore};

pub mod error;

use error::InitializationError;

/// Shared state behind every route and CLI command.
///
/// The embedder and store are shared between the online pipeline and
/// offline ingestion so both agree on the embedding dimension.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub embedder: Arc<dyn EmbeddingClient>,
    pub store: Arc<dyn VectorStore>,
    pub pipeline: RagPipeline,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Loads configuration, opens the configured store and builds the
    /// Gemini clients.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone())
            .load_config()
            .map_err(InitializationError::Config)?;

        let embedder: Arc<dyn EmbeddingClient> = Arc::new(
            GeminiEmbeddingClient::new(&config.gemini, config.embedding.dimension)
                .map_err(InitializationError::Llm)?,
        );
        let generator: Arc<dyn AnswerGenerator> =
            Arc::new(GeminiGenerator::new(&config.gemini).map_err(InitializationError::Llm)?);
        let store = rag::open_store(&config)
            .await
            .map_err(InitializationError::Store)?;

        tracing::info!("Configuration: {}", config.redacted());

        Ok(Arc::new(Self::from_parts(
            paths, config, embedder, generator, store,
        )))
    }

    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: AppConfig,
        embedder: Arc<dyn EmbeddingClient>,
        generator: Arc<dyn AnswerGenerator>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let retriever = Retriever::new(embedder.clone(), store.clone());
        let memory = ShortTermMemory::new(config.memory.max_length);
        let pipeline = RagPipeline::new(retriever, generator, memory, config.retrieval.top_k);

        Self {
            paths,
            config,
            embedder,
            store,
            pipeline,
            started_at: Utc::now(),
        }
    }

    /// Ingestor over the same embedder and store as the pipeline.
    pub fn ingestor(&self) -> Result<Ingestor, RagError> {
        let chunker = rag::chunker_from_config(&self.config)?;
        Ok(Ingestor::new(
            chunker,
            self.embedder.clone(),
            self.store.clone(),
        ))
    }
}
