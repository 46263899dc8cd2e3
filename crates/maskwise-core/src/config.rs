//! Service configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::entity::EntityType;
use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MIN_SCORE: f64 = 0.3;
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Top-level Maskwise configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP server port.
    pub port: u16,
    /// CORS origins allowed to call the service. `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Minimum detector confidence for a span to be considered.
    pub min_score: f64,
    /// Entity types requested from the detector.
    pub entities: Vec<EntityType>,
    /// Language hint for the remote analyzer.
    pub language: String,
    /// Base URL of a remote analyzer. `None` selects the built-in pattern detector.
    pub detector_url: Option<String>,
    /// Optional JSON file with LLM provider settings.
    pub llm_config_file: PathBuf,
    /// Timeout applied to outbound HTTP clients.
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            min_score: DEFAULT_MIN_SCORE,
            entities: EntityType::default_requested().to_vec(),
            language: "en".into(),
            detector_url: None,
            llm_config_file: PathBuf::from("llm-config.json"),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", p)))?,
            None => defaults.port,
        };

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(list) => split_list(&list),
            None => defaults.allowed_origins,
        };

        let min_score = match get("REDACT_MIN_SCORE") {
            Some(s) => {
                let score: f64 = s
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("REDACT_MIN_SCORE is not a number: {}", s)))?;
                if !(0.0..=1.0).contains(&score) {
                    return Err(Error::Config(format!(
                        "REDACT_MIN_SCORE must be within 0.0..=1.0, got {}",
                        score
                    )));
                }
                score
            }
            None => defaults.min_score,
        };

        let entities = match get("REDACT_ENTITIES") {
            Some(list) => {
                let mut parsed = Vec::new();
                for item in split_list(&list) {
                    let t: EntityType = item.parse()?;
                    if !parsed.contains(&t) {
                        parsed.push(t);
                    }
                }
                parsed
            }
            None => defaults.entities,
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(s.trim().parse().map_err(|_| {
                Error::Config(format!("REQUEST_TIMEOUT_SECS is not an integer: {}", s))
            })?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            port,
            allowed_origins,
            min_score,
            entities,
            language: get("REDACT_LANGUAGE").unwrap_or(defaults.language),
            detector_url: get("DETECTOR_URL").map(|u| u.trim().trim_end_matches('/').to_string()),
            llm_config_file: get("LLM_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.llm_config_file),
            request_timeout,
        })
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
