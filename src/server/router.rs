use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{ask, health};
use crate::state::AppState;

/// Creates the application router.
///
/// Routes:
/// - `GET /health`
/// - `POST /ask`
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/health", get(health::health))
        .route("/ask", post(ask::ask))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = resolve_allowed_origins(&state.config.server.cors_allowed_origins)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn resolve_allowed_origins(configured: &[String]) -> Vec<String> {
    let origins = configured
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_local_origins();
    }

    origins
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8000".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppConfig, AppPaths};
    use crate::rag::{DistanceMetric, Segment, VectorStore, GENERATION_ERROR_ANSWER};
    use crate::test_util::{spawn_mock_server, temp_sqlite_store, RecordingGenerator, StaticEmbedder};
    use serde_json::{json, Value};

    async fn serve(generator: RecordingGenerator, seeded: bool) -> String {
        let store = temp_sqlite_store(DistanceMetric::InnerProduct).await;
        store.recreate_schema(2).await.unwrap();
        if seeded {
            store
                .insert_batch(vec![Segment {
                    sequence_index: 0,
                    text: "Kalyani's father is Shambhunath Sen.".to_string(),
                    embedding: vec![1.0, 0.0],
                }])
                .await
                .unwrap();
        }

        let data_dir = std::env::temp_dir().join(format!("rag-qa-router-{}", uuid::Uuid::new_v4()));
        let state = AppState::from_parts(
            Arc::new(AppPaths::with_data_dir(data_dir)),
            AppConfig::default(),
            Arc::new(StaticEmbedder::new(2).failing_on("fail me")),
            Arc::new(generator),
            Arc::new(store),
        );
        spawn_mock_server(router(Arc::new(state))).await
    }

    #[test]
    fn configured_origins_replace_local_defaults() {
        let origins = resolve_allowed_origins(&[" https://qa.example ".to_string(), "".to_string()]);
        assert_eq!(origins, vec!["https://qa.example".to_string()]);
        assert_eq!(resolve_allowed_origins(&[]), default_local_origins());
    }

    #[tokio::test]
    async fn health_reports_segment_count() {
        let base = serve(RecordingGenerator::answering("unused"), true).await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["segments"], 1);
        assert_eq!(body["backend"], "sqlite");
    }

    #[tokio::test]
    async fn ask_returns_answer_chunks_and_history() {
        let base = serve(RecordingGenerator::answering("Shambhunath Sen"), true).await;
        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&json!({"user": "alice", "query": "Who is Kalyani's father?"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["answer"], "Shambhunath Sen");
        assert_eq!(
            body["retrieved_chunks"],
            json!(["Kalyani's father is Shambhunath Sen."])
        );
        assert_eq!(
            body["chat_history"],
            json!([["alice", "Who is Kalyani's father?"]])
        );
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn blank_query_is_a_bad_request() {
        let base = serve(RecordingGenerator::answering("unused"), true).await;
        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&json!({"user": "alice", "query": "   "}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "query must not be empty");
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_bad_request() {
        let base = serve(RecordingGenerator::answering("unused"), true).await;
        let client = reqwest::Client::new();

        let missing_field = client
            .post(format!("{}/ask", base))
            .json(&json!({"user": "alice"}))
            .send()
            .await
            .unwrap();
        assert_eq!(missing_field.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = missing_field.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("query"));

        let not_json = client
            .post(format!("{}/ask", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(not_json.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = not_json.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn embedding_failure_is_a_bad_gateway() {
        let base = serve(RecordingGenerator::answering("unused"), true).await;
        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&json!({"user": "alice", "query": "fail me"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn generation_failure_is_still_a_success_response() {
        let base = serve(RecordingGenerator::failing("quota exceeded"), true).await;
        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&json!({"user": "bob", "query": "Who is Kalyani's father?"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["answer"], GENERATION_ERROR_ANSWER);
        assert_eq!(body["error"]["kind"], "generation");
    }

    #[tokio::test]
    async fn empty_store_answers_with_refusal() {
        let base = serve(RecordingGenerator::answering("unused"), false).await;
        let body: Value = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&json!({"user": "carol", "query": "Anything?"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["answer"], crate::rag::prompt::REFUSAL_SENTENCE);
        assert_eq!(body["retrieved_chunks"], json!([]));
    }
}
