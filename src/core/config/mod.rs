pub mod defaults;
pub mod paths;
pub mod service;
pub mod validation;

pub use paths::AppPaths;
pub use service::{
    AppConfig, ChunkingSettings, ConfigService, DatabaseConfig, GeminiConfig, StoreBackend,
};
pub use validation::validate_config;
