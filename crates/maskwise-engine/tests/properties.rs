//! Property tests for the substitution engine: determinism, token
//! uniqueness, stability and round-trip restoration, over identity-keyed
//! types and over money amounts written in several forms.

use std::collections::{HashMap, HashSet};

use maskwise_engine::{anonymize, find_placeholders, normalize, restore, EntityType, Span};
use proptest::prelude::*;
use proptest::sample::Index;

/// Types whose canonical key is the raw text, so distinct raw values never merge.
const IDENTITY_TYPES: &[EntityType] = &[
    EntityType::Person,
    EntityType::EmailAddress,
    EntityType::Location,
    EntityType::PhoneNumber,
];

/// Cut `text` into non-overlapping spans at the given indices.
fn spans_from_cuts(text: &str, cuts: &[Index], scores: &[u8]) -> Vec<Span> {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(text.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();

    points
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let entity_type = IDENTITY_TYPES[i % IDENTITY_TYPES.len()];
            let score = f64::from(scores.get(i).copied().unwrap_or(50)) / 100.0;
            Span::from_source(entity_type, text, pair[0], pair[1], score).unwrap()
        })
        .collect()
}

fn arb_case() -> impl Strategy<Value = (String, Vec<Index>, Vec<u8>)> {
    (
        "[a-zA-Z0-9 @.,$]{1,80}",
        prop::collection::vec(any::<Index>(), 0..12),
        prop::collection::vec(0u8..=100, 0..6),
    )
}

/// A money amount in one surface form, with its value in cents.
#[derive(Debug, Clone)]
struct MoneyForm {
    raw: String,
    cents: i64,
}

fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn money_form(amount: u32, style: u8) -> MoneyForm {
    let whole = i64::from(amount) * 100;
    match style % 6 {
        0 => MoneyForm { raw: format!("{} USD", amount), cents: whole },
        1 => MoneyForm { raw: format!("{} USD", group_thousands(amount)), cents: whole },
        2 => MoneyForm { raw: format!("-{} USD", amount), cents: -whole },
        3 => MoneyForm { raw: format!("${}", amount), cents: whole },
        4 => MoneyForm { raw: format!("{} dollars", amount), cents: whole },
        // Decimal comma: "10,00" is ten, not a thousand.
        _ => MoneyForm {
            raw: format!("{},{:02} USD", amount / 100, amount % 100),
            cents: i64::from(amount),
        },
    }
}

fn arb_money() -> impl Strategy<Value = Vec<MoneyForm>> {
    let amount = prop_oneof![0u32..20, 0u32..200_000];
    prop::collection::vec((amount, any::<u8>()), 1..8)
        .prop_map(|items| items.into_iter().map(|(a, s)| money_form(a, s)).collect())
}

/// Join the forms into one sentence, with a span over each form.
fn money_text(forms: &[MoneyForm]) -> (String, Vec<Span>) {
    let mut text = String::from("Paid");
    let mut spans = Vec::with_capacity(forms.len());
    for form in forms {
        text.push_str(" then ");
        let start = text.len();
        text.push_str(&form.raw);
        spans.push(Span::from_source(EntityType::Money, &text, start, text.len(), 0.9).unwrap());
    }
    (text, spans)
}

proptest! {
    #[test]
    fn prop_round_trip((text, cuts, scores) in arb_case()) {
        let spans = spans_from_cuts(&text, &cuts, &scores);
        let result = anonymize(&text, spans).unwrap();
        prop_assert_eq!(restore(&result.text, &result.mapping), text);
    }

    #[test]
    fn prop_deterministic((text, cuts, scores) in arb_case()) {
        let spans = spans_from_cuts(&text, &cuts, &scores);
        let mut reversed = spans.clone();
        reversed.reverse();
        let first = anonymize(&text, spans).unwrap();
        let second = anonymize(&text, reversed).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_tokens_unique_per_canonical_value((text, cuts, scores) in arb_case()) {
        let spans = spans_from_cuts(&text, &cuts, &scores);
        let result = anonymize(&text, spans).unwrap();

        let mut by_token: HashMap<&str, (EntityType, String)> = HashMap::new();
        let mut keys = HashSet::new();
        for record in &result.mapping {
            let key = (record.entity_type, normalize(record.entity_type, &record.original).into_owned());
            prop_assert!(keys.insert(key.clone()), "duplicate record for {:?}", key);
            prop_assert!(by_token.insert(record.anonymized.as_str(), key).is_none());
        }
    }

    #[test]
    fn prop_overlapping_candidates_still_round_trip(
        (text, cuts, scores) in arb_case(),
        extra in prop::collection::vec((any::<Index>(), any::<Index>(), 0u8..=100), 0..6),
    ) {
        let mut spans = spans_from_cuts(&text, &cuts, &scores);
        for (a, b, score) in extra {
            let (mut start, mut end) = (a.index(text.len() + 1), b.index(text.len() + 1));
            if start > end {
                std::mem::swap(&mut start, &mut end);
            }
            if start < end {
                spans.push(
                    Span::from_source(EntityType::Location, &text, start, end, f64::from(score) / 100.0)
                        .unwrap(),
                );
            }
        }
        let result = anonymize(&text, spans).unwrap();
        prop_assert_eq!(restore(&result.text, &result.mapping), text);
    }
}

#[test]
fn test_stable_token_for_repeated_value() {
    let text = "Sarah wrote to Sarah";
    let spans = vec![
        Span::from_source(EntityType::Person, text, 0, 5, 0.9).unwrap(),
        Span::from_source(EntityType::Person, text, 15, 20, 0.9).unwrap(),
    ];
    let result = anonymize(text, spans).unwrap();
    assert_eq!(result.text, "<PERSON_1> wrote to <PERSON_1>");
    assert_eq!(result.mapping.len(), 1);
}

#[test]
fn test_echoed_reply_restores_original_sentence() {
    let text = "Contact Sarah at sarah@x.com, she paid 50 USD.";
    let spans = vec![
        Span::from_source(EntityType::Person, text, 8, 13, 0.85).unwrap(),
        Span::from_source(EntityType::EmailAddress, text, 17, 28, 1.0).unwrap(),
        Span::from_source(EntityType::Money, text, 39, 45, 0.9).unwrap(),
    ];
    let result = anonymize(text, spans).unwrap();
    assert_eq!(
        result.text,
        "Contact <PERSON_1> at <EMAIL_ADDRESS_1>, she paid <MONEY_1>."
    );
    assert_eq!(restore(&result.text, &result.mapping), text);
}

proptest! {
    #[test]
    fn prop_different_amounts_never_share_token(forms in arb_money()) {
        let (text, spans) = money_text(&forms);
        let result = anonymize(&text, spans).unwrap();
        let tokens = find_placeholders(&result.text);
        prop_assert_eq!(tokens.len(), forms.len());

        let mut value_of: HashMap<&str, i64> = HashMap::new();
        for (token, form) in tokens.iter().zip(&forms) {
            let cents = *value_of.entry(*token).or_insert(form.cents);
            prop_assert_eq!(cents, form.cents, "{} shared by different amounts", token);
        }
    }

    #[test]
    fn prop_money_round_trip_with_single_raw_forms(forms in arb_money()) {
        let (text, spans) = money_text(&forms);
        let result = anonymize(&text, spans).unwrap();

        let mut raw_forms: HashMap<String, HashSet<&str>> = HashMap::new();
        for form in &forms {
            raw_forms
                .entry(normalize(EntityType::Money, &form.raw).into_owned())
                .or_default()
                .insert(form.raw.as_str());
        }
        if raw_forms.values().all(|raws| raws.len() == 1) {
            prop_assert_eq!(restore(&result.text, &result.mapping), text);
        }
    }

    #[test]
    fn prop_money_deterministic(forms in arb_money()) {
        let (text, spans) = money_text(&forms);
        let mut reversed = spans.clone();
        reversed.reverse();
        prop_assert_eq!(anonymize(&text, spans).unwrap(), anonymize(&text, reversed).unwrap());
    }
}

#[test]
fn test_money_forms_of_one_amount_share_token() {
    let forms: Vec<MoneyForm> = (0..5).map(|style| money_form(1_000, style)).collect();
    let (text, spans) = money_text(&forms);
    let result = anonymize(&text, spans).unwrap();
    // Every form except the negative one is one thousand dollars.
    assert_eq!(
        result.text,
        "Paid then <MONEY_1> then <MONEY_1> then <MONEY_2> then <MONEY_1> then <MONEY_1>"
    );
}
