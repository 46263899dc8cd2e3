//! Entity detector interface and the built-in pattern detector.

use std::sync::Arc;

use async_trait::async_trait;
use maskwise_core::{EntityType, Result};

use crate::recognizer::RecognizerRegistry;
use crate::span::Span;

/// Source of entity spans over a text.
///
/// Implementations are shared read-only across concurrent requests.
/// Returned spans may overlap; they must address valid byte ranges of `text`.
#[async_trait]
pub trait EntityDetector: Send + Sync {
    async fn analyze(
        &self,
        text: &str,
        requested: &[EntityType],
        min_score: f64,
    ) -> Result<Vec<Span>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Regex detector driven by a [`RecognizerRegistry`].
#[derive(Debug, Clone)]
pub struct PatternDetector {
    registry: Arc<RecognizerRegistry>,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::with_registry(RecognizerRegistry::builtin())
    }

    pub fn with_registry(registry: RecognizerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &RecognizerRegistry {
        &self.registry
    }

    /// Synchronous detection used by [`EntityDetector::analyze`].
    pub fn detect(&self, text: &str, requested: &[EntityType], min_score: f64) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for recognizer in self.registry.recognizers() {
            if !requested.contains(&recognizer.entity_type) {
                continue;
            }
            for hit in recognizer.find(text) {
                if hit.score < min_score {
                    continue;
                }
                spans.push(Span::from_source(
                    recognizer.entity_type,
                    text,
                    hit.start,
                    hit.end,
                    hit.score,
                )?);
            }
        }
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        Ok(spans)
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityDetector for PatternDetector {
    async fn analyze(
        &self,
        text: &str,
        requested: &[EntityType],
        min_score: f64,
    ) -> Result<Vec<Span>> {
        self.detect(text, requested, min_score)
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}
