//! Pattern recognizer descriptors.
//!
//! A recognizer is configuration, not code: an entity type, a regex, a base
//! score and a list of context words that raise confidence when they appear
//! shortly before a match. The registry is built once at startup and only
//! read afterwards.

use maskwise_core::{EntityType, Error, Result};
use regex::Regex;

/// Score added when a context hint precedes a match.
pub const CONTEXT_BOOST: f64 = 0.35;

/// Bytes before a match searched for context hints.
pub const CONTEXT_WINDOW: usize = 64;

/// Named capture group that narrows the span to part of the match.
pub const ENTITY_GROUP: &str = "entity";

/// A single regex-based recognizer.
#[derive(Debug, Clone)]
pub struct Recognizer {
    pub name: String,
    pub entity_type: EntityType,
    pub pattern: Regex,
    pub base_score: f64,
    pub context: Vec<String>,
}

/// A raw hit produced by a recognizer: byte range and final score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

impl Recognizer {
    pub fn new(
        name: impl Into<String>,
        entity_type: EntityType,
        pattern: &str,
        base_score: f64,
    ) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("Invalid pattern for recognizer {}: {}", name, e)))?;
        Ok(Self {
            name,
            entity_type,
            pattern,
            base_score: base_score.clamp(0.0, 1.0),
            context: Vec::new(),
        })
    }

    pub fn with_context(mut self, words: &[&str]) -> Self {
        self.context = words.iter().map(|w| w.to_lowercase()).collect();
        self
    }

    /// Find every match in `text`, scored with context enhancement.
    pub fn find(&self, text: &str) -> Vec<Hit> {
        let mut hits = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            let m = match caps.name(ENTITY_GROUP).or_else(|| caps.get(0)) {
                Some(m) if !m.as_str().is_empty() => m,
                _ => continue,
            };
            let score = if self.has_context(text, m.start()) {
                (self.base_score + CONTEXT_BOOST).min(1.0)
            } else {
                self.base_score
            };
            hits.push(Hit {
                start: m.start(),
                end: m.end(),
                score,
            });
        }
        hits
    }

    fn has_context(&self, text: &str, start: usize) -> bool {
        if self.context.is_empty() {
            return false;
        }
        let mut from = start.saturating_sub(CONTEXT_WINDOW);
        while !text.is_char_boundary(from) {
            from += 1;
        }
        let window = text[from..start].to_lowercase();
        window
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| !word.is_empty() && self.context.iter().any(|hint| hint == word))
    }
}

/// (name, type, pattern, base score, context hints)
type Descriptor = (
    &'static str,
    EntityType,
    &'static str,
    f64,
    &'static [&'static str],
);

const BUILTIN: &[Descriptor] = &[
    (
        "email",
        EntityType::EmailAddress,
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        0.9,
        &["email", "mail", "contact"],
    ),
    (
        "phone",
        EntityType::PhoneNumber,
        r"(?:\+?1[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
        0.6,
        &["phone", "call", "tel", "telephone", "mobile", "cell", "number"],
    ),
    (
        "credit_card",
        EntityType::CreditCard,
        r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
        0.8,
        &["card", "credit", "visa", "mastercard", "amex"],
    ),
    (
        "ip_address",
        EntityType::IpAddress,
        r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b",
        0.85,
        &["ip", "server", "host", "address"],
    ),
    (
        "url",
        EntityType::Url,
        r#"https?://[^\s<>"']+"#,
        0.6,
        &["url", "link", "website", "site"],
    ),
    (
        "money_amount_suffix",
        EntityType::Money,
        r"(?i)\b\d[\d,]*(?:\.\d+)?\s?(?:usd|eur|gbp|dollars?|euros?|pounds?)\b",
        0.9,
        &["invoice", "amount", "payment", "paid", "price", "cost"],
    ),
    (
        "money_symbol_suffix",
        EntityType::Money,
        r"\b\d[\d,]*(?:\.\d+)?\s?[$€£]",
        0.9,
        &["invoice", "amount", "payment", "paid", "price", "cost"],
    ),
    (
        "money_symbol_prefix",
        EntityType::Money,
        r"[$€£]\s?\d[\d,]*(?:\.\d+)?",
        0.85,
        &["invoice", "amount", "payment", "paid", "price", "cost"],
    ),
    (
        "date_iso",
        EntityType::DateTime,
        r"\b\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2})?)?\b",
        0.6,
        &["date", "born", "birthday", "dob", "on"],
    ),
    (
        "date_numeric",
        EntityType::DateTime,
        r"\b\d{1,2}/\d{1,2}/\d{2,4}\b",
        0.5,
        &["date", "born", "birthday", "dob", "on"],
    ),
    (
        "date_month_name",
        EntityType::DateTime,
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b",
        0.6,
        &["date", "born", "birthday", "on"],
    ),
    (
        "person_honorific",
        EntityType::Person,
        r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?\s+(?P<entity>[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
        0.6,
        &[],
    ),
    (
        "person_introduction",
        EntityType::Person,
        r"(?i:\bmy name is|\bcall me|\bname:)\s*(?P<entity>[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
        0.5,
        &[],
    ),
    (
        "vehicle_vin",
        EntityType::VehicleId,
        r"\b[A-HJ-NPR-Z0-9]{17}\b",
        0.25,
        &["vin", "vehicle", "car", "truck", "chassis"],
    ),
    (
        "medical_icd10",
        EntityType::MedicalCode,
        r"\b[A-TV-Z][0-9]{2}(?:\.[0-9A-TV-Z]{1,4})?\b",
        0.2,
        &["diagnosis", "diagnosed", "icd", "icd10", "code", "condition"],
    ),
];

/// Immutable set of recognizers shared by every request.
#[derive(Debug, Clone, Default)]
pub struct RecognizerRegistry {
    recognizers: Vec<Recognizer>,
}

impl RecognizerRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in recognizers.
    pub fn builtin() -> Self {
        let recognizers = BUILTIN
            .iter()
            .map(|(name, entity_type, pattern, score, context)| {
                Recognizer::new(*name, *entity_type, pattern, *score)
                    .expect("builtin recognizer pattern is valid")
                    .with_context(context)
            })
            .collect();
        Self { recognizers }
    }

    /// Add a recognizer. Registration only happens while building the registry.
    pub fn with(mut self, recognizer: Recognizer) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    pub fn recognizers(&self) -> &[Recognizer] {
        &self.recognizers
    }

    /// Entity types covered by at least one recognizer.
    pub fn supported_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self.recognizers.iter().map(|r| r.entity_type).collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}
