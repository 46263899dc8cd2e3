//! Text generation for anonymized prompts.
//!
//! The generator only ever sees anonymized text. It is told which
//! placeholder tokens it may use and to invent none; whatever it returns is
//! restored by the engine afterwards.

pub mod config;
pub mod generator;
pub mod prompt;
pub mod providers;
pub mod types;

pub use config::LLMConfig;
pub use generator::{LlmGenerator, TextGenerator};
pub use prompt::system_prompt;
pub use types::*;
