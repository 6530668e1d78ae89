//! Expiry and renewal policy configuration.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::decision::Severity;

/// Policy knobs for the lifecycle engine and gate evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicyConfig {
    /// Validity window per severity.
    #[serde(default)]
    pub severity_days: SeverityDays,

    /// How many times a decision may be renewed.
    #[serde(default = "default_max_renewals")]
    pub max_renewals: u32,

    /// Days before expiry at which a decision counts as expiring soon.
    #[serde(default = "default_warn_window_days")]
    pub warn_window_days: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            severity_days: SeverityDays::default(),
            max_renewals: default_max_renewals(),
            warn_window_days: default_warn_window_days(),
        }
    }
}

/// Upper bound for every day count in the policy (100 years).
pub const MAX_POLICY_DAYS: u32 = 36_500;

impl PolicyConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for severity in Severity::ALL {
            let days = self.severity_days.days_for(severity);
            if days == 0 || days > MAX_POLICY_DAYS {
                return Err(ConfigError::Config(format!(
                    "policy.severityDays.{} must be between 1 and {}, got {}",
                    severity, MAX_POLICY_DAYS, days
                )));
            }
        }
        if self.warn_window_days > MAX_POLICY_DAYS {
            return Err(ConfigError::Config(format!(
                "policy.warnWindowDays must be at most {}, got {}",
                MAX_POLICY_DAYS, self.warn_window_days
            )));
        }
        Ok(())
    }
}

/// Days an acceptance stays valid, by severity.
///
/// Defaults: critical 15, high 30, medium 60, low 90.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityDays {
    #[serde(default = "default_critical_days")]
    pub critical: u32,
    #[serde(default = "default_high_days")]
    pub high: u32,
    #[serde(default = "default_medium_days")]
    pub medium: u32,
    #[serde(default = "default_low_days")]
    pub low: u32,
}

impl SeverityDays {
    /// Configured validity window for `severity`.
    pub fn days_for(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl Default for SeverityDays {
    fn default() -> Self {
        Self {
            critical: default_critical_days(),
            high: default_high_days(),
            medium: default_medium_days(),
            low: default_low_days(),
        }
    }
}

fn default_max_renewals() -> u32 {
    2
}

fn default_warn_window_days() -> u32 {
    7
}

fn default_critical_days() -> u32 {
    Severity::Critical.default_days()
}

fn default_high_days() -> u32 {
    Severity::High.default_days()
}

fn default_medium_days() -> u32 {
    Severity::Medium.default_days()
}

fn default_low_days() -> u32 {
    Severity::Low.default_days()
}
