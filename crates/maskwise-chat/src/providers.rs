//! External LLM provider streaming implementations.
//!
//! Each provider streams tokens via SSE from their respective APIs.
//! OpenAI and Groq use the same format. Anthropic uses a different one.

use std::pin::Pin;

use futures::Stream;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::types::{ChatMessage, LLMProvider, ProviderSettings};

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Meaning of one SSE `data:` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    Token(String),
    Done,
    Error(String),
    Ignore,
}

/// Stream tokens from the configured provider.
pub fn stream_llm(client: &Client, settings: &ProviderSettings, messages: Vec<ChatMessage>) -> BoxedStream {
    match settings.provider {
        LLMProvider::OpenAI => Box::pin(stream_sse(
            openai_request(client, OPENAI_URL, settings, &messages),
            openai_event,
        )),
        LLMProvider::Groq => Box::pin(stream_sse(
            openai_request(client, GROQ_URL, settings, &messages),
            openai_event,
        )),
        LLMProvider::Anthropic => Box::pin(stream_sse(
            anthropic_request(client, settings, &messages),
            anthropic_event,
        )),
    }
}

/// Build a streaming request for OpenAI-compatible APIs (OpenAI, Groq).
fn openai_request(
    client: &Client,
    url: &str,
    settings: &ProviderSettings,
    messages: &[ChatMessage],
) -> RequestBuilder {
    let msgs: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let body = json!({
        "model": settings.model,
        "messages": msgs,
        "temperature": settings.temperature,
        "max_tokens": settings.max_tokens,
        "stream": true,
    });

    debug!("Streaming from {} with model {}", url, settings.model);

    client
        .post(url)
        .header("Authorization", format!("Bearer {}", settings.api_key))
        .header("Content-Type", "application/json")
        .json(&body)
}

/// Build a streaming request for Anthropic's Messages API.
fn anthropic_request(client: &Client, settings: &ProviderSettings, messages: &[ChatMessage]) -> RequestBuilder {
    // Separate system message from conversation
    let system_msg: Option<&str> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str());

    let conv_msgs: Vec<serde_json::Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut body = json!({
        "model": settings.model,
        "messages": conv_msgs,
        "temperature": settings.temperature,
        "max_tokens": settings.max_tokens,
        "stream": true,
    });

    if let Some(sys) = system_msg {
        body["system"] = json!(sys);
    }

    debug!("Streaming from Anthropic with model {}", settings.model);

    client
        .post(ANTHROPIC_URL)
        .header("x-api-key", &settings.api_key)
        .header("anthropic-version", "2023-06-01")
        .header("Content-Type", "application/json")
        .json(&body)
}

/// Interpret an OpenAI-compatible `data:` payload.
pub fn openai_event(data: &str) -> SseEvent {
    if data.trim() == "[DONE]" {
        return SseEvent::Done;
    }
    let parsed: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(_) => return SseEvent::Ignore,
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => SseEvent::Token(content.to_string()),
        _ => SseEvent::Ignore,
    }
}

/// Interpret an Anthropic `data:` payload.
pub fn anthropic_event(data: &str) -> SseEvent {
    let parsed: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(_) => return SseEvent::Ignore,
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Token(text.to_string()),
            _ => SseEvent::Ignore,
        },
        Some("message_stop") => SseEvent::Done,
        Some("error") => {
            let msg = parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error");
            error!("Anthropic error: {}", msg);
            SseEvent::Error(msg.to_string())
        }
        _ => SseEvent::Ignore,
    }
}

/// Send `request` and turn its SSE body into chunks using `parse`.
fn stream_sse(
    request: RequestBuilder,
    parse: fn(&str) -> SseEvent,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // Process complete SSE lines
            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer.drain(..=line_end);

                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                // Anthropic also sends "event: " lines; only data lines matter.
                if let Some(data) = line.strip_prefix("data:") {
                    match parse(data.trim_start()) {
                        SseEvent::Token(text) => {
                            token_count += 1;
                            yield StreamChunk::Token(text);
                        }
                        SseEvent::Done => {
                            yield StreamChunk::Done { tokens_used: token_count };
                            return;
                        }
                        SseEvent::Error(msg) => {
                            yield StreamChunk::Error(msg);
                            return;
                        }
                        SseEvent::Ignore => {}
                    }
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}
