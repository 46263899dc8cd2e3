//! Error types for Maskwise.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid span {start}..{end} over text of length {len}: {reason}")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
        reason: &'static str,
    },

    #[error("Entity detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Text generator failed: {0}")]
    GeneratorFailure(String),

    #[error("No LLM provider configured")]
    NoGenerator,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;
