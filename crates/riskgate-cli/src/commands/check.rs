//! `riskgate risk-check` and the git hook entry points.
//!
//! All three evaluate the gate against the current store and map the verdict
//! to an exit code:
//! - `risk-check`: block-on-expired (strict with `--strict`), exit 1 on block
//! - `hook pre-commit`: warn-on-expiring, always exit 0
//! - `hook pre-push`: block-on-expired, exit 1 on block

use anyhow::{Context, Result};
use chrono::Utc;
use riskgate_core::RiskGateConfig;
use riskgate_engine::{evaluate, Condition, GateItem, GateMode, GateResult, Verdict};
use riskgate_store::StoreFile;
use std::fmt::Write as _;
use std::path::Path;

use crate::OutputFormat;

fn evaluate_now(config: &RiskGateConfig, mode: GateMode) -> Result<GateResult> {
    let store = StoreFile::new(config.store.path.clone())
        .load_snapshot()
        .context("Failed to load decision store")?;
    let result = evaluate(&store, Utc::now(), mode, &config.policy);
    tracing::debug!(
        mode = %mode,
        verdict = %result.verdict,
        items = result.items.len(),
        "Gate evaluated"
    );
    Ok(result)
}

/// `riskgate risk-check [--strict]`.
pub fn risk_check(config: &RiskGateConfig, strict: bool, format: OutputFormat) -> Result<u8> {
    let mode = if strict {
        GateMode::Strict
    } else {
        GateMode::BlockOnExpired
    };
    let result = evaluate_now(config, mode)?;

    match format {
        OutputFormat::Text => print!("{}", render_text(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(result.exit_code())
}

/// `riskgate hook pre-commit`. Never fails the commit.
pub fn pre_commit(config_path: &Path) -> u8 {
    let result = RiskGateConfig::load_or_default(config_path)
        .context("Failed to load configuration")
        .and_then(|config| evaluate_now(&config, GateMode::WarnOnExpiring));

    match result {
        Ok(result) => {
            if !result.items.is_empty() {
                print!("{}", render_text(&result));
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Skipping risk acceptance check");
            eprintln!("⚠️  riskgate: could not check risk acceptances: {e:#}");
        }
    }
    0
}

/// `riskgate hook pre-push`.
pub fn pre_push(config: &RiskGateConfig) -> Result<u8> {
    let result = evaluate_now(config, GateMode::BlockOnExpired)?;
    if !result.items.is_empty() {
        print!("{}", render_text(&result));
    }
    Ok(result.exit_code())
}

fn render_item(out: &mut String, item: &GateItem) {
    let icon = match item.level {
        Verdict::Block => "✗",
        Verdict::Warn => "⚠",
        Verdict::Pass => "✓",
    };
    let _ = writeln!(out, "  {} {}", icon, item.describe());
}

/// Human-readable gate report.
pub fn render_text(result: &GateResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🔍 Checking accepted risks ({})...", result.mode);

    let blocking: Vec<_> = result
        .items
        .iter()
        .filter(|i| i.level == Verdict::Block)
        .collect();
    let warnings: Vec<_> = result
        .items
        .iter()
        .filter(|i| i.level == Verdict::Warn)
        .collect();

    if !blocking.is_empty() {
        let _ = writeln!(out, "\n❌ Blocking ({}):", blocking.len());
        let _ = writeln!(out, "{}", "─".repeat(60));
        for item in &blocking {
            render_item(&mut out, item);
        }
    }

    if !warnings.is_empty() {
        let _ = writeln!(out, "\n⚠️  Warnings ({}):", warnings.len());
        let _ = writeln!(out, "{}", "─".repeat(60));
        for item in &warnings {
            render_item(&mut out, item);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "═".repeat(60));
    match result.verdict {
        Verdict::Pass => {
            let _ = writeln!(out, "✅ No expired risk acceptances.");
        }
        Verdict::Warn | Verdict::Block => {
            let _ = writeln!(
                out,
                "Summary: {} expired, {} expiring soon",
                result.count(Condition::Expired),
                result.count(Condition::ExpiringSoon)
            );
            if result.verdict == Verdict::Block {
                let _ = writeln!(
                    out,
                    "\n❌ Blocked: renew, revoke or remediate the listed acceptances."
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use riskgate_engine::{create_risk_acceptance, NewRiskAcceptance};
    use riskgate_core::{PolicyConfig, Severity};
    use riskgate_store::DecisionStore;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> RiskGateConfig {
        let mut config = RiskGateConfig::default();
        config.resolve_relative_to(dir);
        config
    }

    fn seed(config: &RiskGateConfig, severity: Severity, accepted_days_ago: i64) {
        let file = StoreFile::new(config.store.path.clone());
        let mut store = file.load().unwrap();
        create_risk_acceptance(
            &mut store,
            NewRiskAcceptance {
                risk_category: "vulnerability".to_string(),
                title: "outdated TLS library".to_string(),
                severity: Some(severity),
                accepted_by: "alice".to_string(),
                follow_up_action: "upgrade".to_string(),
                ..Default::default()
            },
            Utc::now() - Duration::days(accepted_days_ago),
            &PolicyConfig::default(),
        )
        .unwrap();
        file.save(&store).unwrap();
    }

    #[test]
    fn test_commands_exit_with_verdict_code() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        seed(&config, Severity::High, 27);

        let warn = evaluate_now(&config, GateMode::WarnOnExpiring).unwrap();
        assert_eq!(warn.verdict, Verdict::Warn);
        assert_eq!(warn.exit_code(), 0);

        let strict = evaluate_now(&config, GateMode::Strict).unwrap();
        assert_eq!(
            risk_check(&config, true, OutputFormat::Json).unwrap(),
            strict.exit_code()
        );
        assert_eq!(
            pre_push(&config).unwrap(),
            Verdict::Pass.exit_code()
        );
    }

    #[test]
    fn test_missing_store_passes() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        assert_eq!(risk_check(&config, false, OutputFormat::Text).unwrap(), 0);
        assert_eq!(pre_push(&config).unwrap(), 0);
    }

    #[test]
    fn test_expired_critical_blocks_push_but_not_commit() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        seed(&config, Severity::Critical, 20);

        assert_eq!(pre_push(&config).unwrap(), 1);
        assert_eq!(risk_check(&config, false, OutputFormat::Json).unwrap(), 1);

        let manifest = dir.path().join("riskgate.yaml");
        std::fs::write(&manifest, "audit:\n  enabled: false\n").unwrap();
        assert_eq!(pre_commit(&manifest), 0);
    }

    #[test]
    fn test_strict_blocks_on_expiring() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        seed(&config, Severity::High, 27);

        assert_eq!(risk_check(&config, false, OutputFormat::Text).unwrap(), 0);
        assert_eq!(risk_check(&config, true, OutputFormat::Text).unwrap(), 1);
    }

    #[test]
    fn test_pre_commit_survives_corrupt_store() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("riskgate.yaml"), "store:\n  path: store.json\n").unwrap();
        std::fs::write(dir.path().join("store.json"), "{ not json").unwrap();

        assert_eq!(pre_commit(&dir.path().join("riskgate.yaml")), 0);

        let config = RiskGateConfig::load_or_default(dir.path().join("riskgate.yaml")).unwrap();
        assert!(pre_push(&config).is_err());
    }

    #[test]
    fn test_render_text_sections() {
        let mut store = DecisionStore::new();
        let now = Utc::now();
        for (id, severity, age) in [("old", Severity::Critical, 20), ("soon", Severity::High, 27)] {
            create_risk_acceptance(
                &mut store,
                NewRiskAcceptance {
                    id: Some(id.to_string()),
                    risk_category: "vulnerability".to_string(),
                    severity: Some(severity),
                    accepted_by: "alice".to_string(),
                    follow_up_action: "upgrade".to_string(),
                    ..Default::default()
                },
                now - Duration::days(age),
                &PolicyConfig::default(),
            )
            .unwrap();
        }

        let warn = evaluate(&store, now, GateMode::WarnOnExpiring, &PolicyConfig::default());
        let text = render_text(&warn);
        assert!(text.contains("Warnings (2)"), "{text}");
        assert!(!text.contains("Blocking"), "{text}");
        assert!(text.contains("Summary: 1 expired, 1 expiring soon"), "{text}");

        let block = evaluate(&store, now, GateMode::BlockOnExpired, &PolicyConfig::default());
        let text = render_text(&block);
        assert!(text.contains("Blocking (1)"), "{text}");
        assert!(text.contains("old (vulnerability)"), "{text}");
        assert!(text.contains("Blocked"), "{text}");

        let empty = evaluate(&DecisionStore::new(), now, GateMode::Strict, &PolicyConfig::default());
        assert!(render_text(&empty).contains("No expired risk acceptances"));
    }
}
