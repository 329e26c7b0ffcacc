use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the ingestion and question-answering pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// Fatal and never retried: missing credentials, invalid chunking
    /// parameters, embedding dimension mismatches.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Recoverable per chunk during ingestion, fatal for a query.
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("generation error: {0}")]
    Generation(String),
}

impl RagError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        RagError::Store(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        RagError::Embedding(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        RagError::Generation(err.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RagError::Configuration(_) => "configuration",
            RagError::Embedding(_) => "embedding",
            RagError::Store(_) => "store",
            RagError::Generation(_) => "generation",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Embedding(_) | RagError::Generation(_) => ApiError::BadGateway(err.to_string()),
            RagError::Configuration(_) | RagError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_failures_map_to_bad_gateway() {
        let api: ApiError = RagError::Embedding("upstream 503".to_string()).into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn store_and_configuration_failures_map_to_internal() {
        let store: ApiError = RagError::store("disk full").into();
        assert_eq!(
            store.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let config: ApiError = RagError::Configuration("no key".to_string()).into();
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn kind_names_each_variant() {
        assert_eq!(RagError::embedding("x").kind(), "embedding");
        assert_eq!(RagError::generation("x").kind(), "generation");
    }
}
