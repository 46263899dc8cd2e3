//! Standalone anonymize and restore endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use maskwise_engine::{restore, MappingRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::process::PromptInput;
use crate::error::ApiError;
use crate::pipeline::anonymize_prompt;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/anonymize", post(anonymize_text))
        .route("/restore", post(restore_text))
}

#[derive(Debug, Serialize)]
struct AnonymizeOutput {
    anonymized_prompt: String,
    mapping: Vec<MappingRecord>,
}

#[derive(Debug, Deserialize)]
struct RestoreInput {
    text: String,
    #[serde(default)]
    mapping: Vec<MappingRecord>,
}

async fn anonymize_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PromptInput>, JsonRejection>,
) -> Result<Json<AnonymizeOutput>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    debug!("POST /anonymize: prompt of {} bytes", input.prompt.len());
    let result = anonymize_prompt(&state, &input.prompt).await?;
    debug!(
        "POST /anonymize: anonymized prompt of {} bytes, {} mapping records",
        result.text.len(),
        result.mapping.len()
    );
    Ok(Json(AnonymizeOutput {
        anonymized_prompt: result.text,
        mapping: result.mapping,
    }))
}

async fn restore_text(
    payload: Result<Json<RestoreInput>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    debug!(
        "POST /restore: text of {} bytes, {} mapping records",
        input.text.len(),
        input.mapping.len()
    );
    let response = restore(&input.text, &input.mapping);
    debug!("POST /restore: response of {} bytes", response.len());
    Ok(Json(serde_json::json!({ "response": response })))
}
