//! Text generator interface and the LLM-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use maskwise_core::{Error, Result};
use reqwest::Client;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::prompt::build_messages;
use crate::providers::{stream_llm, StreamChunk};
use crate::types::ProviderSettings;

/// Produces a reply for an anonymized prompt.
///
/// `allowed` lists the only placeholder tokens the reply may contain.
/// Backend failures are returned as [`Error::GeneratorFailure`], never as
/// reply text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, anonymized: &str, allowed: &[String]) -> Result<String>;

    /// Short description for logs, e.g. `openai/gpt-4o-mini`.
    fn describe(&self) -> String;
}

/// Generator that calls an external LLM provider.
#[derive(Debug, Clone)]
pub struct LlmGenerator {
    client: Client,
    settings: ProviderSettings,
}

impl LlmGenerator {
    pub fn new(settings: ProviderSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        info!("Using {} with model {}", settings.provider, settings.model);
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, anonymized: &str, allowed: &[String]) -> Result<String> {
        let messages = build_messages(anonymized, allowed);
        let stream = stream_llm(&self.client, &self.settings, messages);
        collect_reply(stream).await
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.settings.provider, self.settings.model)
    }
}

/// Drain a provider stream into the final reply text.
pub async fn collect_reply<S>(stream: S) -> Result<String>
where
    S: futures::Stream<Item = StreamChunk> + Send,
{
    tokio::pin!(stream);

    let mut reply = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(text) => reply.push_str(&text),
            StreamChunk::Done { tokens_used } => {
                debug!("Generation finished after {} chunks", tokens_used);
                break;
            }
            StreamChunk::Error(e) => return Err(Error::GeneratorFailure(e)),
        }
    }

    Ok(reply.trim().to_string())
}
