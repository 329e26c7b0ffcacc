use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::rag::AskOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub user: String,
    pub query: String,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskOutcome>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let user = request.user.trim();
    let query = request.query.trim();
    if user.is_empty() {
        return Err(ApiError::BadRequest("user must not be empty".to_string()));
    }
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    match state.pipeline.ask(user, query).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err) => {
            tracing::error!("Ask failed for user {}: {}", user, err);
            Err(err.into())
        }
    }
}
