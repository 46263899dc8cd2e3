//! Detect → anonymize → generate → restore.

use maskwise_core::{Error, Result};
use maskwise_engine::{anonymize, restore, Anonymization, MappingRecord};
use serde::Serialize;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::state::AppState;

/// Response envelope of `POST /process`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub response: String,
    pub anonymized_prompt: String,
    pub mapping: Vec<MappingRecord>,
}

/// Run the configured detector over `prompt` and anonymize it.
pub async fn anonymize_prompt(state: &AppState, prompt: &str) -> Result<Anonymization> {
    let spans = state
        .detector
        .analyze(prompt, &state.config.entities, state.config.min_score)
        .await?;
    debug!(
        "Detector {} returned {} spans",
        state.detector.name(),
        spans.len()
    );

    let result = anonymize(prompt, spans)?;
    info!("Anonymized prompt with {} placeholders", result.mapping.len());
    debug!("Anonymized prompt: {}", result.text);
    Ok(result)
}

/// Full round trip for one prompt.
pub async fn process_prompt(state: &AppState, prompt: &str) -> Result<ProcessResponse> {
    let span = info_span!("process", request_id = %Uuid::new_v4());
    async move {
        let generator = state.generator.as_ref().ok_or(Error::NoGenerator)?;

        let anonymized = anonymize_prompt(state, prompt).await?;
        let reply = generator
            .generate(&anonymized.text, &anonymized.placeholders())
            .await?;
        debug!(
            "Generator {} replied with {} bytes",
            generator.describe(),
            reply.len()
        );

        let response = restore(&reply, &anonymized.mapping);
        Ok::<_, Error>(ProcessResponse {
            response,
            anonymized_prompt: anonymized.text,
            mapping: anonymized.mapping,
        })
    }
    .instrument(span)
    .await
}
