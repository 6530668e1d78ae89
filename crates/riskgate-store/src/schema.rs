//! Persisted format of `decision-store.json` and its migration.
//!
//! ```json
//! { "schemaVersion": "1.1", "decisions": [ { "id": "...", "type": "risk-acceptance", ... } ] }
//! ```
//!
//! Loading always goes through [`migrate`], which accepts any `1.x` document
//! and produces fully typed [`Decision`]s at [`CURRENT_SCHEMA_VERSION`].
//! A document without `schemaVersion` is treated as `1.0`. A document written
//! by a newer `1.x` keeps its version on save, so an older binary never
//! relabels fields it does not know about as `1.1`.
//!
//! Defaults applied to fields missing from a record:
//!
//! | Field | Default |
//! |-------|---------|
//! | `type` | `risk-acceptance` if any of `riskCategory`, `severity`, `expiresAt`, `followUpAction` is present, else `general` |
//! | `severity` | `medium` |
//! | `status` | `active` |
//! | `riskCategory` | `uncategorized` |
//! | `title`, `description`, `followUpAction` | empty string |
//! | `acceptedBy` | `unknown` |
//! | `acceptedAt` | `1970-01-01T00:00:00Z` |
//! | `expiresAt` | `acceptedAt` + built-in validity for the severity |
//! | `renewalCount` | `0` |
//! | `renewedFrom` | absent |
//!
//! Undated legacy records therefore load as expired and surface in the gate.

use chrono::{DateTime, Duration, Utc};
use riskgate_core::{Decision, DecisionKind, DecisionStatus, Severity};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::store::DecisionStore;

/// Version written by this release.
pub const CURRENT_SCHEMA_VERSION: SchemaVersion = SchemaVersion { major: 1, minor: 1 };

/// Version assumed when a document carries no `schemaVersion`.
pub const LEGACY_SCHEMA_VERSION: SchemaVersion = SchemaVersion { major: 1, minor: 0 };

pub const DEFAULT_RISK_CATEGORY: &str = "uncategorized";
pub const DEFAULT_ACCEPTED_BY: &str = "unknown";
pub const DEFAULT_SEVERITY: Severity = Severity::Medium;
pub const DEFAULT_STATUS: DecisionStatus = DecisionStatus::Active;

/// `<major>.<minor>` store format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    /// Same major version: readable, possibly after migration.
    pub fn is_compatible_with(self, other: SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for SchemaVersion {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MigrationError::InvalidVersion(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a persisted document could not be turned into a [`DecisionStore`].
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("malformed JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("unparseable schemaVersion '{0}' (expected <major>.<minor>)")]
    InvalidVersion(String),

    #[error("schemaVersion {found} is incompatible with supported version {supported}")]
    IncompatibleVersion {
        found: SchemaVersion,
        supported: SchemaVersion,
    },

    #[error("decision #{index} is malformed: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("decision #{index} has no id")]
    MissingId { index: usize },

    #[error("duplicate decision id '{0}'")]
    DuplicateId(String),
}

/// Document envelope as found on disk, before migration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStore {
    #[serde(default)]
    schema_version: Option<String>,
    #[serde(default)]
    decisions: Vec<serde_json::Value>,
}

/// A decision as found on disk: every field optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDecision {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    risk_category: Option<String>,
    title: Option<String>,
    description: Option<String>,
    severity: Option<Severity>,
    status: Option<DecisionStatus>,
    accepted_by: Option<String>,
    accepted_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    follow_up_action: Option<String>,
    renewed_from: Option<String>,
    renewal_count: Option<u32>,
    closed_at: Option<DateTime<Utc>>,
    closed_by: Option<String>,
    close_reason: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl RawDecision {
    fn into_decision(self, index: usize) -> Result<Decision, MigrationError> {
        let id = self.id.ok_or(MigrationError::MissingId { index })?;

        let kind = match self.kind {
            Some(kind) => DecisionKind::from(kind),
            None if self.risk_category.is_some()
                || self.severity.is_some()
                || self.expires_at.is_some()
                || self.follow_up_action.is_some() =>
            {
                DecisionKind::RiskAcceptance
            }
            None => DecisionKind::general(),
        };

        let severity = self.severity.unwrap_or(DEFAULT_SEVERITY);
        let accepted_at = self.accepted_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let expires_at = self.expires_at.unwrap_or_else(|| {
            accepted_at
                .checked_add_signed(Duration::days(i64::from(severity.default_days())))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Ok(Decision {
            id,
            kind,
            risk_category: self
                .risk_category
                .unwrap_or_else(|| DEFAULT_RISK_CATEGORY.to_string()),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            severity,
            status: self.status.unwrap_or(DEFAULT_STATUS),
            accepted_by: self
                .accepted_by
                .unwrap_or_else(|| DEFAULT_ACCEPTED_BY.to_string()),
            accepted_at,
            expires_at,
            follow_up_action: self.follow_up_action.unwrap_or_default(),
            renewed_from: self.renewed_from,
            renewal_count: self.renewal_count.unwrap_or(0),
            closed_at: self.closed_at,
            closed_by: self.closed_by,
            close_reason: self.close_reason,
            extra: self.extra,
        })
    }
}

/// Parse and migrate a persisted document.
pub fn parse(content: &str) -> Result<(DecisionStore, SchemaVersion), MigrationError> {
    let raw: RawStore = serde_json::from_str(content).map_err(MigrationError::InvalidJson)?;
    migrate(raw.schema_version.as_deref(), raw.decisions)
}

/// Upgrade a document of any compatible version to [`CURRENT_SCHEMA_VERSION`],
/// or keep its version when it is a newer minor.
///
/// Returns the migrated store and the version the document was written with.
fn migrate(
    version: Option<&str>,
    records: Vec<serde_json::Value>,
) -> Result<(DecisionStore, SchemaVersion), MigrationError> {
    let found = match version {
        Some(v) => v.parse::<SchemaVersion>()?,
        None => LEGACY_SCHEMA_VERSION,
    };

    if !found.is_compatible_with(CURRENT_SCHEMA_VERSION) {
        return Err(MigrationError::IncompatibleVersion {
            found,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if found > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            "Decision store was written with newer schema {}; unknown fields are preserved",
            found
        );
    }

    let mut seen = HashSet::new();
    let mut decisions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let raw: RawDecision = serde_json::from_value(record)
            .map_err(|source| MigrationError::InvalidRecord { index, source })?;
        let decision = raw.into_decision(index)?;
        if !seen.insert(decision.id.clone()) {
            return Err(MigrationError::DuplicateId(decision.id));
        }
        decisions.push(decision);
    }

    let version = found.max(CURRENT_SCHEMA_VERSION);
    Ok((DecisionStore::from_decisions(decisions, version), found))
}
