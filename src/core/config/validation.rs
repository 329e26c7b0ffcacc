use super::service::AppConfig;
use crate::core::errors::RagError;
use crate::rag::ChunkingConfig;

pub fn validate_config(config: &AppConfig) -> Result<(), RagError> {
    ChunkingConfig::new(config.chunking.chunk_size, config.chunking.overlap)?;

    let api_key_missing = config
        .gemini
        .api_key
        .as_deref()
        .map(|key| key.trim().is_empty())
        .unwrap_or(true);
    if api_key_missing {
        return Err(RagError::Configuration(
            "GEMINI_API_KEY is not set".to_string(),
        ));
    }

    validate_positive("embedding.dimension", config.embedding.dimension as u64)?;
    validate_positive("retrieval.top_k", config.retrieval.top_k as u64)?;
    validate_positive("memory.max_length", config.memory.max_length as u64)?;
    validate_positive(
        "gemini.request_timeout_secs",
        config.gemini.request_timeout_secs,
    )?;
    validate_positive(
        "database.max_connections",
        config.database.max_connections as u64,
    )?;

    validate_url("gemini.embedding_url", &config.gemini.embedding_url)?;
    validate_url("gemini.generation_url", &config.gemini.generation_url)?;

    Ok(())
}

fn validate_positive(path: &str, value: u64) -> Result<(), RagError> {
    if value == 0 {
        return Err(RagError::Configuration(format!(
            "{} must be greater than zero",
            path
        )));
    }
    Ok(())
}

fn validate_url(path: &str, value: &str) -> Result<(), RagError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(());
    }
    Err(RagError::Configuration(format!(
        "{} must be an http(s) URL, got {:?}",
        path, value
    )))
}
