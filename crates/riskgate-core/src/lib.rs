//! # riskgate-core
//!
//! Shared types for the riskgate workspace: the [`Decision`] record and its
//! enums, plus the `riskgate.yaml` configuration manifest.

// Decision record, severity and status enums
pub mod decision;

// Configuration types shared across all riskgate crates
pub mod config;

pub use config::{
    AuditConfig, ConfigError, PolicyConfig, RiskGateConfig, SeverityDays, StoreConfig,
    DEFAULT_MANIFEST, MAX_POLICY_DAYS,
};
pub use decision::{
    new_decision_id, Decision, DecisionKind, DecisionStatus, EffectiveStatus, ParseSeverityError,
    Severity,
};
