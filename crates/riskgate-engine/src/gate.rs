//! Gate evaluation: store contents + clock → pass / warn / block.
//!
//! [`evaluate`] is a pure function. It never mutates the store, and calling it
//! twice with the same inputs yields identical results.

use chrono::{DateTime, Utc};
use riskgate_core::{Decision, PolicyConfig, Severity};
use riskgate_store::DecisionStore;
use serde::Serialize;
use std::fmt;

use crate::lifecycle::{list_expired_decisions, list_expiring_soon};

/// Which conditions the gate reports, and how loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateMode {
    /// Pre-commit: expired and expiring-soon decisions produce warnings, never a block.
    WarnOnExpiring,
    /// Pre-push and `risk-check`: expired decisions block.
    BlockOnExpired,
    /// `risk-check --strict`: expired and expiring-soon decisions block.
    Strict,
}

impl fmt::Display for GateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateMode::WarnOnExpiring => write!(f, "warn-on-expiring"),
            GateMode::BlockOnExpired => write!(f, "block-on-expired"),
            GateMode::Strict => write!(f, "strict"),
        }
    }
}

/// Gate outcome. Ordered `Pass < Warn < Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Block,
}

impl Verdict {
    /// Process exit code for hooks and CI: `1` on block, `0` otherwise.
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Block => 1,
            Verdict::Pass | Verdict::Warn => 0,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Warn => write!(f, "WARN"),
            Verdict::Block => write!(f, "BLOCK"),
        }
    }
}

/// Why a decision was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Expired,
    ExpiringSoon,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Expired => write!(f, "expired"),
            Condition::ExpiringSoon => write!(f, "expiring soon"),
        }
    }
}

/// A single reported decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateItem {
    pub decision_id: String,
    pub title: String,
    pub risk_category: String,
    pub severity: Severity,
    pub expires_at: DateTime<Utc>,
    pub condition: Condition,
    /// Contribution of this item to the verdict.
    pub level: Verdict,
    /// Whole days until expiry; negative once overdue.
    pub days_remaining: i64,
}

impl GateItem {
    fn new(decision: &Decision, condition: Condition, level: Verdict, now: DateTime<Utc>) -> Self {
        Self {
            decision_id: decision.id.clone(),
            title: decision.title.clone(),
            risk_category: decision.risk_category.clone(),
            severity: decision.severity,
            expires_at: decision.expires_at,
            condition,
            level,
            days_remaining: decision.days_remaining(now),
        }
    }

    /// One-line human-readable description.
    pub fn describe(&self) -> String {
        let when = match self.condition {
            Condition::Expired => format!("expired {} day(s) ago", -self.days_remaining),
            Condition::ExpiringSoon => format!("expires in {} day(s)", self.days_remaining),
        };
        let title = if self.title.is_empty() {
            self.risk_category.as_str()
        } else {
            self.title.as_str()
        };
        format!(
            "[{}] {} ({}): {} on {}",
            self.severity,
            self.decision_id,
            title,
            when,
            self.expires_at.format("%Y-%m-%d")
        )
    }
}

/// Result of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub verdict: Verdict,
    pub mode: GateMode,
    pub evaluated_at: DateTime<Utc>,
    /// Severity descending, then `expiresAt` ascending.
    pub items: Vec<GateItem>,
}

impl GateResult {
    pub fn exit_code(&self) -> u8 {
        self.verdict.exit_code()
    }

    pub fn count(&self, condition: Condition) -> usize {
        self.items.iter().filter(|i| i.condition == condition).count()
    }
}

/// Evaluate the gate.
///
/// - `WarnOnExpiring`: every expired or expiring-soon decision is a warning.
/// - `BlockOnExpired`: every expired decision blocks; expiring-soon ones are
///   not reported.
/// - `Strict`: expired and expiring-soon decisions both block.
///
/// The warn window is `config.warn_window_days`. An empty store passes.
pub fn evaluate(
    store: &DecisionStore,
    now: DateTime<Utc>,
    mode: GateMode,
    config: &PolicyConfig,
) -> GateResult {
    let (expired_level, expiring_level) = match mode {
        GateMode::WarnOnExpiring => (Verdict::Warn, Some(Verdict::Warn)),
        GateMode::BlockOnExpired => (Verdict::Block, None),
        GateMode::Strict => (Verdict::Block, Some(Verdict::Block)),
    };

    let mut items: Vec<GateItem> = list_expired_decisions(store, now)
        .into_iter()
        .map(|d| (d, Condition::Expired, expired_level))
        .chain(expiring_level.into_iter().flat_map(|level| {
            list_expiring_soon(store, now, config.warn_window_days)
                .into_iter()
                .map(move |d| (d, Condition::ExpiringSoon, level))
        }))
        .map(|(d, condition, level)| GateItem::new(d, condition, level, now))
        .collect();

    items.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(a.expires_at.cmp(&b.expires_at))
            .then_with(|| a.decision_id.cmp(&b.decision_id))
    });

    let verdict = items
        .iter()
        .map(|i| i.level)
        .max()
        .unwrap_or(Verdict::Pass);

    GateResult {
        verdict,
        mode,
        evaluated_at: now,
        items,
    }
}
