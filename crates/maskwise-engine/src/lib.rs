//! Reversible substitution engine.
//!
//! Turns detector spans into a deterministic anonymized text plus a mapping
//! table, and reverses that mapping on generated replies. Each request owns
//! its own [`RequestContext`]; nothing here holds state across requests.
//! Detectors live behind the [`EntityDetector`] trait and are shared
//! read-only.

pub mod detector;
pub mod normalize;
pub mod placeholder;
pub mod recognizer;
pub mod remote;
pub mod restore;
pub mod rewrite;
pub mod span;

pub use detector::{EntityDetector, PatternDetector};
pub use normalize::normalize;
pub use placeholder::{MappingRecord, RequestContext};
pub use recognizer::{Recognizer, RecognizerRegistry};
pub use remote::RemoteDetector;
pub use restore::{find_placeholders, is_placeholder, restore};
pub use rewrite::{anonymize, resolve_overlaps, Anonymization};
pub use span::Span;

pub use maskwise_core::EntityType;
