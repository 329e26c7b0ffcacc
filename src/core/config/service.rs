use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults;
use super::paths::AppPaths;
use super::validation::validate_config;
use crate::core::errors::RagError;
use crate::rag::DistanceMetric;

const REDACT_PLACEHOLDER: &str = "****";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = RagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "postgres" | "postgresql" | "pgvector" => Ok(StoreBackend::Postgres),
            other => Err(RagError::Configuration(format!(
                "unknown store backend: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means the local development origins.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Overrides the SQLite file location; defaults to `<data_dir>/rag.db`.
    pub sqlite_path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            host: defaults::DB_HOST.to_string(),
            port: defaults::DB_PORT,
            name: defaults::DB_NAME.to_string(),
            user: defaults::DB_USER.to_string(),
            password: String::new(),
            sqlite_path: None,
            max_connections: defaults::DB_MAX_CONNECTIONS,
        }
    }
}

/// Generation always runs at temperature 0, so there is no temperature
/// setting; unknown keys such as `temperature` are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub embedding_url: String,
    pub embedding_model: String,
    pub generation_url: String,
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            embedding_url: defaults::GEMINI_EMBEDDING_URL.to_string(),
            embedding_model: defaults::GEMINI_EMBEDDING_MODEL.to_string(),
            generation_url: defaults::GEMINI_GENERATION_URL.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub dimension: usize,
    pub metric: DistanceMetric,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            dimension: defaults::EMBEDDING_DIMENSION,
            metric: DistanceMetric::InnerProduct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: defaults::CHUNK_SIZE,
            overlap: defaults::CHUNK_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: defaults::TOP_K,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub max_length: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_length: defaults::MEMORY_MAX_LENGTH,
        }
    }
}

/// Process configuration. Built once at startup and handed to each
/// component's constructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gemini: GeminiConfig,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub memory: MemorySettings,
}

impl AppConfig {
    /// Layers environment variables over the current values. `lookup`
    /// is injected so tests do not touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }

        if let Some(v) = lookup("DB_BACKEND") {
            self.database.backend = v.parse()?;
        }
        if let Some(v) = lookup("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            self.database.port = parse_var("DB_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("DB_PASS") {
            self.database.password = v;
        }
        if let Some(v) = lookup("SQLITE_PATH") {
            self.database.sqlite_path = Some(PathBuf::from(v));
        }

        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(v);
        }
        if let Some(v) = lookup("GEMINI_EMBEDDING_URL") {
            self.gemini.embedding_url = v;
        }
        if let Some(v) = lookup("GEMINI_API_URL") {
            self.gemini.generation_url = v;
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.gemini.request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = lookup("EMBEDDING_DIMENSION") {
            self.embedding.dimension = parse_var("EMBEDDING_DIMENSION", &v)?;
        }
        if let Some(v) = lookup("DISTANCE_METRIC") {
            self.embedding.metric = v.parse()?;
        }

        if let Some(v) = lookup("CHUNK_SIZE") {
            self.chunking.chunk_size = parse_var("CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("CHUNK_OVERLAP") {
            self.chunking.overlap = parse_var("CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = lookup("TOP_K") {
            self.retrieval.top_k = parse_var("TOP_K", &v)?;
        }
        if let Some(v) = lookup("MEMORY_MAX_LENGTH") {
            self.memory.max_length = parse_var("MEMORY_MAX_LENGTH", &v)?;
        }

        Ok(())
    }

    /// Serialized view safe for logs: credentials are masked.
    pub fn redacted(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Some(key) = value.pointer_mut("/gemini/api_key") {
            if !key.is_null() {
                *key = Value::String(REDACT_PLACEHOLDER.to_string());
            }
        }
        if let Some(password) = value.pointer_mut("/database/password") {
            if password.as_str().is_some_and(|p| !p.is_empty()) {
                *password = Value::String(REDACT_PLACEHOLDER.to_string());
            }
        }
        value
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, RagError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| {
        RagError::Configuration(format!("invalid value for {}: {:?} ({})", name, raw, err))
    })
}

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    /// Reads the optional YAML file, applies the process environment on
    /// top and validates the result.
    pub fn load_config(&self) -> Result<AppConfig, RagError> {
        let mut config = load_yaml_file(&self.paths.config_path)?;
        config.apply_env_overrides(|key| env::var(key).ok())?;
        if config.database.sqlite_path.is_none() {
            config.database.sqlite_path = Some(self.paths.sqlite_path.clone());
        }
        validate_config(&config)?;
        Ok(config)
    }
}

fn load_yaml_file(path: &Path) -> Result<AppConfig, RagError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|err| {
        RagError::Configuration(format!("failed to read {}: {}", path.display(), err))
    })?;
    serde_yaml::from_str::<AppConfig>(&contents).map_err(|err| {
        RagError::Configuration(format!("failed to parse {}: {}", path.display(), err))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.overlap, 500);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.memory.max_length, 10);
        assert_eq!(config.embedding.metric, DistanceMetric::InnerProduct);
    }

    #[test]
    fn env_overrides_replace_defaults() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(lookup_from(&[
                ("CHUNK_SIZE", "400"),
                ("CHUNK_OVERLAP", "100"),
                ("DB_BACKEND", "postgres"),
                ("DB_PORT", "6543"),
                ("GEMINI_API_KEY", "secret"),
                ("DISTANCE_METRIC", "cosine"),
                ("EMBEDDING_DIMENSION", "768"),
            ]))
            .unwrap();

        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.chunking.overlap, 100);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.embedding.metric, DistanceMetric::Cosine);
        assert_eq!(config.embedding.dimension, 768);
    }

    #[test]
    fn unparsable_env_value_is_a_configuration_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(lookup_from(&[("CHUNK_SIZE", "big")]))
            .unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));
    }

    #[test]
    fn redacted_masks_credentials() {
        let mut config = AppConfig::default();
        config.gemini.api_key = Some("AIza-real-key".to_string());
        config.database.password = "hunter2".to_string();

        let redacted = config.redacted();
        assert_eq!(redacted["gemini"]["api_key"], "****");
        assert_eq!(redacted["database"]["password"], "****");
        assert_eq!(redacted["chunking"]["chunk_size"], 1000);
    }

    #[test]
    fn yaml_file_is_layered_under_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "chunking:\n  chunk_size: 300\n  overlap: 30\nretrieval:\n  top_k: 2\n",
        )
        .unwrap();

        let mut config = load_yaml_file(&path).unwrap();
        assert_eq!(config.chunking.chunk_size, 300);
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.memory.max_length, 10);

        config
            .apply_env_overrides(lookup_from(&[("TOP_K", "6")]))
            .unwrap();
        assert_eq!(config.retrieval.top_k, 6);
    }

    #[test]
    fn yaml_temperature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "gemini:\n  temperature: 0.7\n").unwrap();

        let err = load_yaml_file(&path).unwrap_err();
        assert!(matches!(err, RagError::Configuration(ref msg) if msg.contains("temperature")));
    }

    #[test]
    fn missing_yaml_file_yields_defaults() {
        let config = load_yaml_file(Path::new("/nonexistent/rag-qa/config.yml")).unwrap();
        assert_eq!(config.chunking.chunk_size, 1000);
    }
}
