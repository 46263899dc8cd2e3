//! Detector hits over the source text.

use maskwise_core::{EntityType, Error, Result};
use serde::{Deserialize, Serialize};

/// A detected entity with its byte range in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub text: String,
}

impl Span {
    /// Build a span whose `text` is sliced from `source`.
    ///
    /// Fails with `InvalidSpan` when the range does not address `source`.
    pub fn from_source(
        entity_type: EntityType,
        source: &str,
        start: usize,
        end: usize,
        score: f64,
    ) -> Result<Self> {
        check_range(source, start, end)?;
        Ok(Self {
            entity_type,
            start,
            end,
            score,
            text: source[start..end].to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Half-open range intersection.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check that this span addresses a non-empty slice of `source`.
    pub fn validate(&self, source: &str) -> Result<()> {
        check_range(source, self.start, self.end)
    }
}

fn check_range(source: &str, start: usize, end: usize) -> Result<()> {
    let invalid = |reason| Error::InvalidSpan {
        start,
        end,
        len: source.len(),
        reason,
    };
    if start >= end {
        return Err(invalid("start must precede end"));
    }
    if end > source.len() {
        return Err(invalid("range exceeds text bounds"));
    }
    if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
        return Err(invalid("range splits a UTF-8 character"));
    }
    Ok(())
}
