//! HTTP client for a Presidio-compatible analyzer service.
//!
//! The analyzer reports character offsets; spans carry byte offsets, so
//! every result is converted against the source text.

use std::time::Duration;

use async_trait::async_trait;
use maskwise_core::{EntityType, Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detector::EntityDetector;
use crate::span::Span;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    language: &'a str,
    entities: Vec<&'static str>,
    score_threshold: f64,
}

/// One analyzer result as returned by `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerResult {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// Detector backed by a remote analyzer.
#[derive(Debug, Clone)]
pub struct RemoteDetector {
    client: Client,
    base_url: String,
    language: String,
}

impl RemoteDetector {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EntityDetector for RemoteDetector {
    async fn analyze(
        &self,
        text: &str,
        requested: &[EntityType],
        min_score: f64,
    ) -> Result<Vec<Span>> {
        if text.is_empty() || requested.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/analyze", self.base_url);
        let body = AnalyzeRequest {
            text,
            language: &self.language,
            entities: requested.iter().map(|t| t.label()).collect(),
            score_threshold: min_score,
        };

        debug!("Analyzing {} bytes via {}", text.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::DetectorUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DetectorUnavailable(format!(
                "Analyzer error {}: {}",
                status, body
            )));
        }

        let results: Vec<AnalyzerResult> = response
            .json()
            .await
            .map_err(|e| Error::DetectorUnavailable(format!("Malformed analyzer response: {}", e)))?;

        to_spans(text, &results, requested, min_score)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Convert analyzer results (character offsets) into byte-offset spans.
pub fn to_spans(
    text: &str,
    results: &[AnalyzerResult],
    requested: &[EntityType],
    min_score: f64,
) -> Result<Vec<Span>> {
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut spans = Vec::with_capacity(results.len());
    for result in results {
        let entity_type: EntityType = match result.entity_type.parse() {
            Ok(t) => t,
            Err(_) => {
                warn!("Skipping unsupported analyzer entity type {}", result.entity_type);
                continue;
            }
        };
        if !requested.contains(&entity_type) || result.score < min_score {
            continue;
        }

        let (start, end) = match (boundaries.get(result.start), boundaries.get(result.end)) {
            (Some(&s), Some(&e)) => (s, e),
            _ => {
                return Err(Error::InvalidSpan {
                    start: result.start,
                    end: result.end,
                    len: boundaries.len() - 1,
                    reason: "analyzer offsets exceed text bounds",
                })
            }
        };
        spans.push(Span::from_source(entity_type, text, start, end, result.score)?);
    }
    Ok(spans)
}
