use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let segments = state.store.count().await?;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);

    Ok(Json(json!({
        "status": "ok",
        "backend": state.config.database.backend,
        "metric": state.config.embedding.metric,
        "segments": segments,
        "memory_entries": state.pipeline.memory().len(),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": uptime_secs,
    })))
}
