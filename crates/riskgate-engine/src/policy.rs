//! Severity-based expiry policy.

use chrono::{DateTime, Duration, Utc};
use riskgate_core::{PolicyConfig, Severity, SeverityDays};

/// Deadline for an acceptance of `severity` made at `now`, using the built-in
/// windows: critical 15 days, high 30, medium 60, low 90.
pub fn default_expiry_for_severity(severity: Severity, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(i64::from(severity.default_days()))
}

/// Expiry computation with configured windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpiryPolicy {
    days: SeverityDays,
}

impl ExpiryPolicy {
    pub fn new(days: SeverityDays) -> Self {
        Self { days }
    }

    /// Deadline for `severity` accepted at `now`; `None` when it falls outside
    /// the representable date range.
    pub fn expiry_for(&self, severity: Severity, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(Duration::days(i64::from(self.days.days_for(severity))))
    }

    pub fn days_for(&self, severity: Severity) -> u32 {
        self.days.days_for(severity)
    }
}

impl From<&PolicyConfig> for ExpiryPolicy {
    fn from(config: &PolicyConfig) -> Self {
        Self::new(config.severity_days)
    }
}
