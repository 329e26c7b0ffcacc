use thiserror::Error;

use crate::core::errors::RagError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] RagError),

    #[error("Failed to open vector store: {0}")]
    Store(#[source] RagError),

    #[error("Failed to initialize Gemini clients: {0}")]
    Llm(#[source] RagError),
}
