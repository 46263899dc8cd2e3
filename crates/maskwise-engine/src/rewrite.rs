//! Overlap resolution and placeholder splicing.

use std::cmp::Ordering;

use maskwise_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::normalize::normalize;
use crate::placeholder::{MappingRecord, RequestContext};
use crate::span::Span;

/// Anonymized text and the mapping needed to reverse it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anonymization {
    pub text: String,
    /// Ordered by the start of each value's first occurrence.
    pub mapping: Vec<MappingRecord>,
}

impl Anonymization {
    /// Placeholder tokens the generator is allowed to use.
    pub fn placeholders(&self) -> Vec<String> {
        self.mapping.iter().map(|r| r.anonymized.clone()).collect()
    }
}

/// Keep a non-overlapping subset of `spans`, preferring higher scores, then
/// longer spans, then earlier starts. The result is ordered by `start`.
pub fn resolve_overlaps(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.entity_type.cmp(&b.entity_type))
    });

    let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if accepted.iter().all(|kept| !kept.overlaps(&span)) {
            accepted.push(span);
        }
    }

    accepted.sort_by(|a, b| match a.start.cmp(&b.start) {
        Ordering::Equal => a.end.cmp(&b.end),
        other => other,
    });
    accepted
}

/// Replace every accepted span in `text` with its placeholder token.
///
/// Tokens are allocated in ascending `start` order within a fresh
/// [`RequestContext`], so the same input always yields the same output.
pub fn anonymize(text: &str, spans: Vec<Span>) -> Result<Anonymization> {
    for span in &spans {
        span.validate(text)?;
        if !span.text.is_empty() && span.text != text[span.start..span.end] {
            return Err(Error::InvalidSpan {
                start: span.start,
                end: span.end,
                len: text.len(),
                reason: "span text does not match source",
            });
        }
    }

    if spans.is_empty() {
        return Ok(Anonymization {
            text: text.to_string(),
            mapping: Vec::new(),
        });
    }

    let candidates = spans.len();
    let accepted = resolve_overlaps(spans);
    debug!(
        "Accepted {} of {} candidate spans",
        accepted.len(),
        candidates
    );

    let mut ctx = RequestContext::new();
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;

    for span in &accepted {
        let original = &text[span.start..span.end];
        let canonical = normalize(span.entity_type, original);
        let token = ctx.assign(span.entity_type, &canonical, original);

        out.push_str(&text[last_end..span.start]);
        out.push_str(&token);
        last_end = span.end;
    }
    out.push_str(&text[last_end..]);

    Ok(Anonymization {
        text: out,
        mapping: ctx.into_mapping(),
    })
}
