//! Clients for the external embedding and text-generation services.

pub mod embedding;
pub mod generation;
pub mod types;

pub use embedding::{EmbeddingClient, GeminiEmbeddingClient};
pub use generation::{AnswerGenerator, GeminiGenerator};
pub use types::EmbeddingIntent;
