//! Per-request placeholder allocation.

use std::collections::HashMap;

use maskwise_core::EntityType;
use serde::{Deserialize, Serialize};

/// One substitution, as exposed to callers and over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub original: String,
    pub anonymized: String,
}

/// Format a placeholder token, e.g. `<PERSON_1>`.
pub fn placeholder_token(entity_type: EntityType, ordinal: u32) -> String {
    format!("<{}_{}>", entity_type.label(), ordinal)
}

/// Counters and the canonical-value table for a single request.
///
/// Created at the start of a request and dropped at its end. Ordinals are
/// per entity type, so numbering restarts at 1 for every type.
#[derive(Debug, Default)]
pub struct RequestContext {
    counters: HashMap<EntityType, u32>,
    assigned: HashMap<(EntityType, String), String>,
    records: Vec<MappingRecord>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the token for `(entity_type, canonical)`, allocating one on first sight.
    ///
    /// `original` is recorded only when a new token is allocated.
    pub fn assign(&mut self, entity_type: EntityType, canonical: &str, original: &str) -> String {
        let key = (entity_type, canonical.to_string());
        if let Some(token) = self.assigned.get(&key) {
            return token.clone();
        }

        let counter = self.counters.entry(entity_type).or_insert(0);
        *counter += 1;
        let token = placeholder_token(entity_type, *counter);

        self.records.push(MappingRecord {
            entity_type,
            original: original.to_string(),
            anonymized: token.clone(),
        });
        self.assigned.insert(key, token.clone());
        token
    }

    /// Records in allocation order.
    pub fn records(&self) -> &[MappingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_mapping(self) -> Vec<MappingRecord> {
        self.records
    }
}
