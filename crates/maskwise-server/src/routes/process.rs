//! Health check and the full anonymize → generate → restore round trip.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::pipeline::{process_prompt, ProcessResponse};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health))
        .route("/process", get(process_get).post(process))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromptInput {
    #[serde(default)]
    pub prompt: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "active" }))
}

async fn process_get() -> ApiError {
    ApiError::MethodNotAllowed("Use POST method")
}

async fn process(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PromptInput>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    debug!("POST /process: prompt of {} bytes", input.prompt.len());
    let response = process_prompt(&state, &input.prompt).await?;
    debug!(
        "POST /process: response of {} bytes, {} mapping records",
        response.response.len(),
        response.mapping.len()
    );
    Ok(Json(response))
}
