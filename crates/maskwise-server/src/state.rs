//! Shared application state.
//!
//! Everything here is read-only after startup. Per-request mutable state
//! (counters, mapping) lives inside the engine call for that request.

use std::sync::Arc;

use maskwise_chat::{LLMConfig, LlmGenerator, TextGenerator};
use maskwise_core::{Result, ServiceConfig};
use maskwise_engine::{EntityDetector, PatternDetector, RemoteDetector};
use tracing::{info, warn};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ServiceConfig,
    pub detector: Arc<dyn EntityDetector>,
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        detector: Arc<dyn EntityDetector>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            config,
            detector,
            generator,
        }
    }

    /// Build the detector and generator selected by `config`.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let detector = build_detector(&config)?;

        let llm_config = LLMConfig::load(&config.llm_config_file);
        let generator: Option<Arc<dyn TextGenerator>> = match llm_config.settings() {
            Some(settings) => Some(Arc::new(LlmGenerator::new(
                settings,
                config.request_timeout,
            )?)),
            None => {
                warn!("No LLM provider configured; /process will return 503");
                None
            }
        };

        Ok(Self::new(config, detector, generator))
    }
}

/// Remote analyzer when `detector_url` is set, otherwise the built-in patterns.
pub fn build_detector(config: &ServiceConfig) -> Result<Arc<dyn EntityDetector>> {
    let detector: Arc<dyn EntityDetector> = match &config.detector_url {
        Some(url) => {
            info!("Using remote analyzer at {}", url);
            Arc::new(RemoteDetector::new(
                url.clone(),
                config.language.clone(),
                config.request_timeout,
            )?)
        }
        None => {
            let detector = PatternDetector::new();
            info!(
                "Using pattern detector ({} recognizers)",
                detector.registry().len()
            );
            Arc::new(detector)
        }
    };
    Ok(detector)
}
