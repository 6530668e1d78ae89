//! Audit journal configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the audit journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether lifecycle mutations are journaled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// NDJSON journal path.
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_path(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_path() -> PathBuf {
    PathBuf::from(".riskgate/audit-log.ndjson")
}
