//! Canonical dedup keys for entity text.
//!
//! The key only decides whether two occurrences share a placeholder. It is
//! never written into any output text.

use std::borrow::Cow;

use maskwise_core::EntityType;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<sign>[-+])?\s*(?P<pre>[^0-9\s+-]+)?\s*(?P<amount>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<post>[^0-9\s]+)?$",
    )
    .expect("money regex is valid")
});

/// Comma used strictly as a thousands separator, e.g. `1,000` or `12,345.60`.
static THOUSANDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?$").expect("thousands regex is valid")
});

/// Currency designators (lowercase) and their ISO 4217 codes.
const CURRENCY_TABLE: &[(&str, &str)] = &[
    ("$", "USD"),
    ("us$", "USD"),
    ("usd", "USD"),
    ("dollar", "USD"),
    ("dollars", "USD"),
    ("buck", "USD"),
    ("bucks", "USD"),
    ("€", "EUR"),
    ("eur", "EUR"),
    ("euro", "EUR"),
    ("euros", "EUR"),
    ("£", "GBP"),
    ("gbp", "GBP"),
    ("pound", "GBP"),
    ("pounds", "GBP"),
    ("quid", "GBP"),
    ("¥", "JPY"),
    ("jpy", "JPY"),
    ("yen", "JPY"),
    ("₹", "INR"),
    ("inr", "INR"),
    ("rupee", "INR"),
    ("rupees", "INR"),
    ("chf", "CHF"),
    ("franc", "CHF"),
    ("francs", "CHF"),
    ("c$", "CAD"),
    ("cad", "CAD"),
    ("a$", "AUD"),
    ("aud", "AUD"),
];

/// Canonicalize `raw` for `entity_type`.
///
/// Money amounts map onto `"[-]<amount> <ISO>"`; every other type is the
/// identity. Text that cannot be canonicalized falls back to `raw`.
pub fn normalize(entity_type: EntityType, raw: &str) -> Cow<'_, str> {
    match entity_type {
        EntityType::Money => match canonical_money(raw) {
            Some(key) => Cow::Owned(key),
            None => {
                debug!("Money value did not canonicalize, deduplicating on raw text");
                Cow::Borrowed(raw)
            }
        },
        _ => Cow::Borrowed(raw),
    }
}

fn canonical_money(raw: &str) -> Option<String> {
    let caps = MONEY_RE.captures(raw.trim())?;
    let amount = canonical_amount(caps.name("amount")?.as_str())?;
    let sign = match caps.name("sign").map(|m| m.as_str()) {
        Some("-") => "-",
        _ => "",
    };

    let pre = caps.name("pre").map(|m| m.as_str());
    let post = caps
        .name("post")
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter(|s| !s.is_empty());

    // A leading designator must be a known currency. Unknown trailing words
    // are kept uppercased.
    let code = match (pre, post) {
        (None, None) => return None,
        (Some(p), None) => lookup(p)?.to_string(),
        (None, Some(p)) => currency_code(p),
        (Some(a), Some(b)) => {
            let code = lookup(a)?;
            if lookup(b) != Some(code) {
                return None;
            }
            code.to_string()
        }
    };

    Some(format!("{}{} {}", sign, amount, code))
}

/// Strip thousands separators and insignificant fractional zeros.
///
/// Any other use of a comma (decimal comma, irregular grouping) is ambiguous
/// and yields `None`.
fn canonical_amount(amount: &str) -> Option<String> {
    let mut digits = if amount.contains(',') {
        if !THOUSANDS_RE.is_match(amount) {
            return None;
        }
        amount.replace(',', "")
    } else {
        amount.to_string()
    };
    if digits.contains('.') {
        let trimmed = digits.trim_end_matches('0').trim_end_matches('.').len();
        digits.truncate(trimmed);
    }
    Some(digits)
}

fn currency_code(designator: &str) -> String {
    lookup(designator)
        .map(str::to_string)
        .unwrap_or_else(|| designator.to_uppercase())
}

fn lookup(designator: &str) -> Option<&'static str> {
    let lower = designator.to_lowercase();
    CURRENCY_TABLE
        .iter()
        .find(|(word, _)| *word == lower)
        .map(|(_, code)| *code)
}
