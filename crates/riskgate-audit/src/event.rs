//! Audit event types.
//!
//! One [`AuditEvent`] is recorded per lifecycle mutation:
//! `{timestamp, actor, eventType, decisionId, details}`.

use chrono::{DateTime, Utc};
use riskgate_core::Decision;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    /// A risk acceptance was created.
    #[serde(rename = "risk.accepted")]
    RiskAccepted,
    /// An active acceptance was superseded by a renewal.
    #[serde(rename = "risk.renewed")]
    RiskRenewed,
    /// An acceptance was revoked.
    #[serde(rename = "risk.revoked")]
    RiskRevoked,
    /// The accepted risk was remediated.
    #[serde(rename = "risk.remediated")]
    RiskRemediated,
}

impl AuditEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RiskAccepted => "risk.accepted",
            Self::RiskRenewed => "risk.renewed",
            Self::RiskRevoked => "risk.revoked",
            Self::RiskRemediated => "risk.remediated",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// When the mutation happened.
    pub timestamp: DateTime<Utc>,

    /// Who performed it.
    pub actor: String,

    pub event_type: AuditEventType,

    /// Decision the mutation applied to (the successor, for renewals).
    pub decision_id: String,

    /// Event-specific payload (always a JSON object).
    #[serde(default = "empty_details")]
    pub details: Value,
}

fn empty_details() -> Value {
    Value::Object(Map::new())
}

impl AuditEvent {
    /// Create a new audit event stamped with the current time.
    pub fn new(
        event_type: AuditEventType,
        actor: impl Into<String>,
        decision_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: actor.into(),
            event_type,
            decision_id: decision_id.into(),
            details: empty_details(),
        }
    }

    /// Create a builder for an audit event.
    pub fn builder(
        event_type: AuditEventType,
        actor: impl Into<String>,
        decision_id: impl Into<String>,
    ) -> AuditEventBuilder {
        AuditEventBuilder::new(event_type, actor, decision_id)
    }

    /// `risk.accepted` for a freshly created decision.
    pub fn accepted(decision: &Decision, at: DateTime<Utc>) -> Self {
        Self::builder(
            AuditEventType::RiskAccepted,
            decision.accepted_by.as_str(),
            decision.id.as_str(),
        )
        .at(at)
        .decision_summary(decision)
        .build()
    }

    /// `risk.renewed` for `successor`, which replaced its `renewedFrom`.
    pub fn renewed(successor: &Decision, actor: &str, at: DateTime<Utc>) -> Self {
        let mut builder = Self::builder(AuditEventType::RiskRenewed, actor, successor.id.as_str())
            .at(at)
            .decision_summary(successor)
            .detail("renewalCount", successor.renewal_count);
        if let Some(ref predecessor) = successor.renewed_from {
            builder = builder.detail("renewedFrom", predecessor.as_str());
        }
        builder.build()
    }

    /// `risk.revoked` with the revocation reason.
    pub fn revoked(decision: &Decision, actor: &str, reason: &str, at: DateTime<Utc>) -> Self {
        Self::builder(AuditEventType::RiskRevoked, actor, decision.id.as_str())
            .at(at)
            .detail("reason", reason)
            .build()
    }

    /// `risk.remediated` with the remediation note.
    pub fn remediated(decision: &Decision, actor: &str, note: &str, at: DateTime<Utc>) -> Self {
        Self::builder(AuditEventType::RiskRemediated, actor, decision.id.as_str())
            .at(at)
            .detail("note", note)
            .build()
    }

    /// Format the event as a human-readable log line.
    ///
    /// Format: `[timestamp] risk.revoked decision=... actor=... key=value...`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] {} decision={} actor={}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            self.event_type,
            self.decision_id,
            self.actor,
        );

        if let Some(details) = self.details.as_object() {
            for (key, value) in details {
                match value {
                    Value::String(s) => line.push_str(&format!(" {}=\"{}\"", key, s.replace('"', "'"))),
                    other => line.push_str(&format!(" {}={}", key, other)),
                }
            }
        }

        line
    }
}

/// Builder for creating audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    event: AuditEvent,
}

impl AuditEventBuilder {
    /// Create a new builder with required fields.
    pub fn new(
        event_type: AuditEventType,
        actor: impl Into<String>,
        decision_id: impl Into<String>,
    ) -> Self {
        Self {
            event: AuditEvent::new(event_type, actor, decision_id),
        }
    }

    /// Set the event timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.event.timestamp = timestamp;
        self
    }

    /// Add one key to the details object.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(ref mut map) = self.event.details {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Record the classification and deadline of `decision`.
    pub fn decision_summary(self, decision: &Decision) -> Self {
        self.detail("riskCategory", decision.risk_category.as_str())
            .detail("severity", decision.severity.as_str())
            .detail("expiresAt", decision.expires_at.to_rfc3339())
    }

    /// Build the audit event.
    pub fn build(self) -> AuditEvent {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_builder() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let event = AuditEvent::builder(AuditEventType::RiskRevoked, "alice", "d-1")
            .at(at)
            .detail("reason", "vendor shipped a fix")
            .build();

        assert_eq!(event.event_type, AuditEventType::RiskRevoked);
        assert_eq!(event.actor, "alice");
        assert_eq!(event.decision_id, "d-1");
        assert_eq!(event.timestamp, at);
        assert_eq!(event.details["reason"], "vendor shipped a fix");
    }

    #[test]
    fn test_wire_format() {
        let event = AuditEvent::builder(AuditEventType::RiskAccepted, "bob", "d-2").build();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["eventType"], "risk.accepted");
        assert_eq!(json["decisionId"], "d-2");
        assert_eq!(json["actor"], "bob");
        assert!(json["details"].is_object());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_missing_details_defaults_to_empty_object() {
        let line = r#"{"timestamp":"2025-01-01T00:00:00Z","actor":"a","eventType":"risk.remediated","decisionId":"x"}"#;
        let event: AuditEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.event_type, AuditEventType::RiskRemediated);
        assert_eq!(event.details, Value::Object(Map::new()));
    }

    #[test]
    fn test_to_log_line() {
        let event = AuditEvent::builder(AuditEventType::RiskRenewed, "carol", "d-3")
            .detail("renewedFrom", "d-2")
            .detail("renewalCount", 1)
            .build();

        let log_line = event.to_log_line();
        assert!(log_line.contains("risk.renewed"));
        assert!(log_line.contains("decision=d-3"));
        assert!(log_line.contains("actor=carol"));
        assert!(log_line.contains("renewedFrom=\"d-2\""));
        assert!(log_line.contains("renewalCount=1"));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(format!("{}", AuditEventType::RiskAccepted), "risk.accepted");
        assert_eq!(format!("{}", AuditEventType::RiskRemediated), "risk.remediated");
    }
}
