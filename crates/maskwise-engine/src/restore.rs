//! Reverse substitution on generated replies.
//!
//! The generator may omit, repeat, or invent placeholder tokens. Known tokens
//! are restored to their original text; anything else shaped like a
//! placeholder is deleted.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::placeholder::MappingRecord;

/// `<` + upper snake case identifier + `_` + decimal ordinal + `>`.
const PLACEHOLDER_PATTERN: &str = r"<[A-Z][A-Z0-9_]*_[0-9]+>";

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder regex is valid"));

static PLACEHOLDER_EXACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}$", PLACEHOLDER_PATTERN)).expect("placeholder regex is valid")
});

/// Whether `s` is exactly one placeholder token.
pub fn is_placeholder(s: &str) -> bool {
    PLACEHOLDER_EXACT_RE.is_match(s)
}

/// All placeholder-shaped substrings of `text`, in order of appearance.
pub fn find_placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Restore `generated` using `mapping` and drop unknown placeholders.
///
/// Runs as a single left-to-right pass, so restored original text is never
/// rescanned. Text outside matched tokens is left untouched.
pub fn restore(generated: &str, mapping: &[MappingRecord]) -> String {
    let mut originals: HashMap<&str, &str> = HashMap::with_capacity(mapping.len());
    for record in mapping {
        originals
            .entry(record.anonymized.as_str())
            .or_insert(record.original.as_str());
    }

    let mut irregular: Vec<&str> = originals
        .keys()
        .copied()
        .filter(|token| !token.is_empty() && !is_placeholder(token))
        .collect();

    let matcher: Cow<'_, Regex> = if irregular.is_empty() {
        Cow::Borrowed(&*PLACEHOLDER_RE)
    } else {
        // Longest first so a token never loses to one of its own prefixes.
        irregular.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation: Vec<String> = irregular.iter().map(|t| regex::escape(t)).collect();
        let pattern = format!("{}|{}", alternation.join("|"), PLACEHOLDER_PATTERN);
        match Regex::new(&pattern) {
            Ok(re) => Cow::Owned(re),
            Err(e) => {
                debug!("Falling back to sequential token replacement: {}", e);
                let mut text = generated.to_string();
                for token in &irregular {
                    text = text.replace(token, originals[token]);
                }
                return replace_with(&PLACEHOLDER_RE, &text, &originals);
            }
        }
    };

    replace_with(&matcher, generated, &originals)
}

fn replace_with(re: &Regex, text: &str, originals: &HashMap<&str, &str>) -> String {
    let mut dropped = 0usize;
    let restored = re.replace_all(text, |caps: &Captures| match originals.get(&caps[0]) {
        Some(original) => (*original).to_string(),
        None => {
            dropped += 1;
            String::new()
        }
    });
    if dropped > 0 {
        debug!("Removed {} unrecognized placeholder tokens", dropped);
    }
    restored.into_owned()
}
