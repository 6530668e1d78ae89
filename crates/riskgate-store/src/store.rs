//! In-memory decision store.

use riskgate_core::Decision;
use serde::Serialize;
use std::collections::HashSet;

use crate::schema::{SchemaVersion, CURRENT_SCHEMA_VERSION};

/// Ordered collection of decisions keyed by id.
///
/// Decisions are never removed; insertion order is preserved so the
/// persisted file reads as a history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionStore {
    schema_version: SchemaVersion,
    decisions: Vec<Decision>,
}

impl Default for DecisionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionStore {
    /// Empty store at the current schema version.
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            decisions: Vec::new(),
        }
    }

    pub(crate) fn from_decisions(decisions: Vec<Decision>, schema_version: SchemaVersion) -> Self {
        Self {
            schema_version,
            decisions,
        }
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Decision> {
        self.decisions.iter_mut().find(|d| d.id == id)
    }

    /// Append a decision. Returns `false` (and leaves the store untouched)
    /// when the id is already taken.
    pub fn insert(&mut self, decision: Decision) -> bool {
        if self.contains(&decision.id) {
            return false;
        }
        self.decisions.push(decision);
        true
    }

    /// Risk-acceptance records only, in store order.
    pub fn risk_decisions(&self) -> Vec<&Decision> {
        self.decisions
            .iter()
            .filter(|d| d.is_risk_acceptance())
            .collect()
    }

    /// The decision `id` followed by its predecessors via `renewedFrom`,
    /// newest first. Stops at a dangling reference or a cycle.
    pub fn lineage(&self, id: &str) -> Vec<&Decision> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.get(id);

        while let Some(decision) = next {
            if !seen.insert(decision.id.as_str()) {
                break;
            }
            chain.push(decision);
            next = decision
                .renewed_from
                .as_deref()
                .and_then(|prev| self.get(prev));
        }

        chain
    }

    /// The decision that renewed `id`, if any.
    pub fn successor_of(&self, id: &str) -> Option<&Decision> {
        self.decisions
            .iter()
            .find(|d| d.renewed_from.as_deref() == Some(id))
    }
}
