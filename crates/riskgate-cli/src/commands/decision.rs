//! `riskgate accept | renew | revoke | remediate`.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use riskgate_core::{RiskGateConfig, Severity};
use riskgate_engine::{MutationOutcome, NewRiskAcceptance, RiskLifecycle};

/// Arguments of `riskgate accept`.
#[derive(Debug, Clone)]
pub struct AcceptArgs {
    pub id: Option<String>,
    pub category: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub accepted_by: String,
    pub follow_up: String,
    pub expires_at: Option<String>,
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_expires_at(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid --expires-at '{value}': expected RFC 3339 or YYYY-MM-DD"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid --expires-at '{value}'"))?;
    Ok(midnight.and_utc())
}

fn report(verb: &str, outcome: &MutationOutcome) {
    let d = &outcome.decision;
    println!("✅ {} {} [{}]", verb, d.id, d.severity);
    println!("   status:     {}", d.status);
    println!("   expires at: {}", d.expires_at.to_rfc3339());
    if let Some(ref from) = d.renewed_from {
        println!("   renewed from {} (renewal {})", from, d.renewal_count);
    }
    if let Some(ref warning) = outcome.audit_warning {
        eprintln!("⚠️  Audit journal not updated: {warning}");
    }
}

pub fn accept(config: &RiskGateConfig, args: AcceptArgs) -> Result<u8> {
    let expires_at = args
        .expires_at
        .as_deref()
        .map(parse_expires_at)
        .transpose()?;

    let input = NewRiskAcceptance {
        id: args.id,
        risk_category: args.category,
        title: args.title,
        description: args.description,
        severity: Some(args.severity),
        accepted_by: args.accepted_by,
        follow_up_action: args.follow_up,
        expires_at,
    };

    let outcome = RiskLifecycle::from_config(config)
        .create(input, Utc::now())
        .context("Failed to record risk acceptance")?;
    report("Accepted", &outcome);
    Ok(0)
}

pub fn renew(config: &RiskGateConfig, id: &str, actor: &str) -> Result<u8> {
    let outcome = RiskLifecycle::from_config(config)
        .renew(id, actor, Utc::now())
        .with_context(|| format!("Failed to renew {id}"))?;
    report("Renewed as", &outcome);
    Ok(0)
}

pub fn revoke(config: &RiskGateConfig, id: &str, reason: &str, actor: &str) -> Result<u8> {
    let outcome = RiskLifecycle::from_config(config)
        .revoke(id, reason, actor, Utc::now())
        .with_context(|| format!("Failed to revoke {id}"))?;
    report("Revoked", &outcome);
    Ok(0)
}

pub fn remediate(config: &RiskGateConfig, id: &str, note: &str, actor: &str) -> Result<u8> {
    let outcome = RiskLifecycle::from_config(config)
        .remediate(id, note, actor, Utc::now())
        .with_context(|| format!("Failed to mark {id} remediated"))?;
    report("Remediated", &outcome);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use riskgate_core::DecisionStatus;
    use riskgate_engine::LifecycleError;
    use riskgate_store::StoreFile;
    use tempfile::tempdir;

    fn args(id: &str) -> AcceptArgs {
        AcceptArgs {
            id: Some(id.to_string()),
            category: "compliance".to_string(),
            severity: Severity::Medium,
            title: "Missing SBOM for vendor image".to_string(),
            description: String::new(),
            accepted_by: "alice".to_string(),
            follow_up: "request SBOM from vendor".to_string(),
            expires_at: None,
        }
    }

    #[test]
    fn test_parse_expires_at_formats() {
        assert_eq!(
            parse_expires_at("2030-03-01").unwrap(),
            Utc.with_ymd_and_hms(2030, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_expires_at("2030-03-01T12:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2030, 3, 1, 10, 30, 0).unwrap()
        );
        assert!(parse_expires_at("next tuesday").is_err());
    }

    #[test]
    fn test_accept_then_close() {
        let dir = tempdir().unwrap();
        let mut config = RiskGateConfig::default();
        config.resolve_relative_to(dir.path());

        accept(&config, args("sbom-1")).unwrap();
        remediate(&config, "sbom-1", "SBOM received", "bob").unwrap();

        let store = StoreFile::new(config.store.path.clone()).load().unwrap();
        let decision = store.get("sbom-1").unwrap();
        assert_eq!(decision.status, DecisionStatus::Remediated);
        assert_eq!(decision.closed_by.as_deref(), Some("bob"));

        let err = revoke(&config, "sbom-1", "late", "bob").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_accept_rejects_past_deadline() {
        let dir = tempdir().unwrap();
        let mut config = RiskGateConfig::default();
        config.resolve_relative_to(dir.path());

        let mut past = args("old");
        past.expires_at = Some("2001-01-01".to_string());
        let err = accept(&config, past).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::Validation(_))
        ));
    }
}
