//! Configuration types for riskgate.
//!
//! Configuration is loaded from a single YAML manifest (`riskgate.yaml`).
//! Every field has a named default, so an absent manifest or an empty file
//! yields a working configuration.
//!
//! ```yaml
//! store:
//!   path: .riskgate/decision-store.json
//! audit:
//!   enabled: true
//!   path: .riskgate/audit-log.ndjson
//! policy:
//!   severityDays: { critical: 15, high: 30, medium: 60, low: 90 }
//!   maxRenewals: 2
//!   warnWindowDays: 7
//! ```

pub mod audit;
pub mod policy;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use audit::AuditConfig;
pub use policy::{PolicyConfig, SeverityDays, MAX_POLICY_DAYS};
pub use store::StoreConfig;

/// Default manifest file name, looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "riskgate.yaml";

/// Complete riskgate configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskGateConfig {
    /// Decision store location.
    #[serde(default)]
    pub store: StoreConfig,

    /// Audit journal settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Expiry and renewal policy.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskGateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    ///
    /// An empty document is accepted and yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the manifest at `path` if it exists, otherwise the defaults.
    ///
    /// Relative store and audit paths are resolved against the manifest's
    /// directory.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let mut config = Self::from_file(path)?;
        if let Some(base_dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_relative_to(base_dir);
        }
        Ok(config)
    }

    /// Make relative file paths relative to `base_dir`.
    pub fn resolve_relative_to(&mut self, base_dir: impl AsRef<Path>) {
        let base_dir = base_dir.as_ref();
        if self.store.path.is_relative() {
            self.store.path = base_dir.join(&self.store.path);
        }
        if self.audit.path.is_relative() {
            self.audit.path = base_dir.join(&self.audit.path);
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use std::path::PathBuf;

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let config = RiskGateConfig::from_yaml("").unwrap();
        assert_eq!(config, RiskGateConfig::default());
        assert_eq!(config.policy.max_renewals, 2);
        assert_eq!(config.policy.warn_window_days, 7);
        assert_eq!(
            config.store.path,
            PathBuf::from(".riskgate/decision-store.json")
        );
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
policy:
  severityDays:
    critical: 7
  warnWindowDays: 14
"#;
        let config = RiskGateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.policy.severity_days.days_for(Severity::Critical), 7);
        assert_eq!(config.policy.severity_days.days_for(Severity::High), 30);
        assert_eq!(config.policy.warn_window_days, 14);
        assert_eq!(config.policy.max_renewals, 2);
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_zero_day_severity_rejected() {
        let yaml = "policy:\n  severityDays:\n    low: 0\n";
        let err = RiskGateConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_oversized_day_counts_rejected() {
        for yaml in [
            "policy:\n  warnWindowDays: 4000000000\n",
            "policy:\n  severityDays:\n    low: 4000000000\n",
            "policy:\n  severityDays:\n    critical: 36501\n",
        ] {
            match RiskGateConfig::from_yaml(yaml) {
                Err(ConfigError::Config(msg)) => assert!(msg.contains("36500"), "{msg}"),
                other => panic!("expected config error for {yaml:?}, got {other:?}"),
            }
        }

        let yaml = "policy:\n  warnWindowDays: 36500\n  severityDays:\n    low: 36500\n";
        let config = RiskGateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.policy.warn_window_days, policy::MAX_POLICY_DAYS);
    }

    #[test]
    fn test_unknown_manifest_field_rejected() {
        let yaml = "policy:\n  maxRenewal: 3\n";
        assert!(matches!(
            RiskGateConfig::from_yaml(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_manifest_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RiskGateConfig::load_or_default(dir.path().join("riskgate.yaml")).unwrap();
        assert_eq!(config, RiskGateConfig::default());
    }

    #[test]
    fn test_paths_resolved_against_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("riskgate.yaml");
        fs::write(&manifest, "store:\n  path: state/decisions.json\n").unwrap();

        let config = RiskGateConfig::load_or_default(&manifest).unwrap();
        assert_eq!(config.store.path, dir.path().join("state/decisions.json"));
        assert_eq!(
            config.audit.path,
            dir.path().join(".riskgate/audit-log.ndjson")
        );
    }
}
