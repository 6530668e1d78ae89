//! Decision records.
//!
//! A [`Decision`] is one entry of the decision store. Risk acceptances are
//! decisions of kind [`DecisionKind::RiskAcceptance`]; they carry a severity,
//! an expiry and a lifecycle status. The `expired` condition is never stored:
//! it is derived from `status` and the clock (see [`Decision::effective_status`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a fresh decision id.
pub fn new_decision_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Severity
// ============================================================================

/// Urgency classification of an accepted risk.
///
/// Ordered by urgency: `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most urgent first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Number of days an acceptance of this severity stays valid when no
    /// policy override is configured.
    pub fn default_days(self) -> u32 {
        match self {
            Severity::Critical => 15,
            Severity::High => 30,
            Severity::Medium => 60,
            Severity::Low => 90,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::High => 2,
            Severity::Medium => 1,
            Severity::Low => 0,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown severity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{0}' (expected critical, high, medium or low)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Persisted lifecycle status of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    /// Accepted and in force (possibly past its expiry).
    Active,
    /// Superseded by a successor decision.
    Renewed,
    /// Withdrawn.
    Revoked,
    /// The underlying risk was fixed.
    Remediated,
}

impl DecisionStatus {
    /// Frozen states admit no further transitions.
    pub fn is_frozen(self) -> bool {
        !matches!(self, DecisionStatus::Active)
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Renewed => write!(f, "renewed"),
            Self::Revoked => write!(f, "revoked"),
            Self::Remediated => write!(f, "remediated"),
        }
    }
}

/// Status as observed at a given instant, including the derived `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Active,
    Expired,
    Renewed,
    Revoked,
    Remediated,
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Renewed => write!(f, "renewed"),
            Self::Revoked => write!(f, "revoked"),
            Self::Remediated => write!(f, "remediated"),
        }
    }
}

// ============================================================================
// Kind
// ============================================================================

/// Record type. The store may hold decisions other than risk acceptances;
/// those are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DecisionKind {
    RiskAcceptance,
    Other(String),
}

impl DecisionKind {
    pub const RISK_ACCEPTANCE: &'static str = "risk-acceptance";
    pub const GENERAL: &'static str = "general";

    pub fn general() -> Self {
        DecisionKind::Other(Self::GENERAL.to_string())
    }
}

impl From<String> for DecisionKind {
    fn from(value: String) -> Self {
        if value == Self::RISK_ACCEPTANCE {
            DecisionKind::RiskAcceptance
        } else {
            DecisionKind::Other(value)
        }
    }
}

impl From<DecisionKind> for String {
    fn from(kind: DecisionKind) -> Self {
        match kind {
            DecisionKind::RiskAcceptance => DecisionKind::RISK_ACCEPTANCE.to_string(),
            DecisionKind::Other(other) => other,
        }
    }
}

// ============================================================================
// Decision
// ============================================================================

/// A single decision record.
///
/// Field names on the wire are camelCase (`riskCategory`, `acceptedBy`,
/// `expiresAt`, ...). Fields this version does not know about are kept in
/// `extra` so a load/save cycle never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Unique, immutable identifier.
    pub id: String,

    /// Record type.
    #[serde(rename = "type")]
    pub kind: DecisionKind,

    pub risk_category: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub severity: Severity,

    pub status: DecisionStatus,

    /// Who accepted the risk.
    pub accepted_by: String,

    pub accepted_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Remediation plan.
    pub follow_up_action: String,

    /// Id of the decision this one renewed (lineage only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewed_from: Option<String>,

    #[serde(default)]
    pub renewal_count: u32,

    /// When the decision left the `active` state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<String>,

    /// Revocation reason or remediation note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,

    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Decision {
    /// Whether this record takes part in the risk lifecycle.
    pub fn is_risk_acceptance(&self) -> bool {
        self.kind == DecisionKind::RiskAcceptance
    }

    /// `true` when the decision is active and its deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == DecisionStatus::Active && now > self.expires_at
    }

    /// `true` when the decision is active and expires within
    /// `[now, now + window_days]`. A window reaching past the representable
    /// range has no upper bound.
    pub fn is_expiring_within(&self, now: DateTime<Utc>, window_days: u32) -> bool {
        let within_horizon = now
            .checked_add_signed(chrono::Duration::days(i64::from(window_days)))
            .is_none_or(|horizon| self.expires_at <= horizon);
        self.status == DecisionStatus::Active && now <= self.expires_at && within_horizon
    }

    /// Status including the derived `expired` condition.
    pub fn effective_status(&self, now: DateTime<Utc>) -> EffectiveStatus {
        match self.status {
            DecisionStatus::Active if self.is_expired(now) => EffectiveStatus::Expired,
            DecisionStatus::Active => EffectiveStatus::Active,
            DecisionStatus::Renewed => EffectiveStatus::Renewed,
            DecisionStatus::Revoked => EffectiveStatus::Revoked,
            DecisionStatus::Remediated => EffectiveStatus::Remediated,
        }
    }

    /// Whole days until expiry; negative once overdue.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn sample(status: DecisionStatus, expires_in_days: i64) -> Decision {
        Decision {
            id: "d-1".to_string(),
            kind: DecisionKind::RiskAcceptance,
            risk_category: "dependency".to_string(),
            title: "Outdated TLS library".to_string(),
            description: String::new(),
            severity: Severity::High,
            status,
            accepted_by: "alice".to_string(),
            accepted_at: t0(),
            expires_at: t0() + Duration::days(expires_in_days),
            follow_up_action: "Upgrade after freeze".to_string(),
            renewed_from: None,
            renewal_count: 0,
            closed_at: None,
            closed_by: None,
            close_reason: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);

        let mut all = vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        all.sort_by(|a, b| b.cmp(a));
        assert_eq!(all, Severity::ALL.to_vec());
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("Critical".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!(" low ".parse::<Severity>(), Ok(Severity::Low));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_expired_is_derived_from_active_only() {
        let now = t0() + Duration::days(31);
        assert!(sample(DecisionStatus::Active, 30).is_expired(now));
        assert!(!sample(DecisionStatus::Revoked, 30).is_expired(now));
        assert!(!sample(DecisionStatus::Renewed, 30).is_expired(now));
        assert_eq!(
            sample(DecisionStatus::Active, 30).effective_status(now),
            EffectiveStatus::Expired
        );
        assert_eq!(
            sample(DecisionStatus::Remediated, 30).effective_status(now),
            EffectiveStatus::Remediated
        );
    }

    #[test]
    fn test_expiry_boundary_is_not_expired() {
        let decision = sample(DecisionStatus::Active, 30);
        assert!(!decision.is_expired(decision.expires_at));
        assert!(decision.is_expiring_within(decision.expires_at, 7));
    }

    #[test]
    fn test_expiring_window() {
        let decision = sample(DecisionStatus::Active, 30);
        assert!(decision.is_expiring_within(t0() + Duration::days(23), 7));
        assert!(!decision.is_expiring_within(t0() + Duration::days(22), 7));
        assert!(!decision.is_expiring_within(t0() + Duration::days(31), 7));
    }

    #[test]
    fn test_unbounded_window_does_not_overflow() {
        let decision = sample(DecisionStatus::Active, 30);
        assert!(decision.is_expiring_within(t0(), u32::MAX));
        assert!(!decision.is_expiring_within(t0() + Duration::days(31), u32::MAX));
        assert!(!sample(DecisionStatus::Revoked, 30).is_expiring_within(t0(), u32::MAX));
    }

    #[test]
    fn test_kind_wire_format() {
        let json = serde_json::to_value(sample(DecisionStatus::Active, 30)).unwrap();
        assert_eq!(json["type"], "risk-acceptance");
        assert_eq!(json["riskCategory"], "dependency");
        assert_eq!(json["severity"], "high");
        assert!(json.get("renewedFrom").is_none());

        let kind: DecisionKind = serde_json::from_str("\"architecture\"").unwrap();
        assert_eq!(kind, DecisionKind::Other("architecture".to_string()));
    }
}
