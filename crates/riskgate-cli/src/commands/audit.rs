//! `riskgate audit`: read the journal back.

use anyhow::{Context, Result};
use riskgate_audit::{AuditEvent, AuditFilter, AuditLogger};
use riskgate_core::{AuditConfig, RiskGateConfig};

use crate::OutputFormat;

/// Render events as log lines (text) or NDJSON (json), oldest first.
pub fn render(events: &[AuditEvent], format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    for event in events {
        let line = match format {
            OutputFormat::Text => event.to_log_line(),
            OutputFormat::Json => serde_json::to_string(event)?,
        };
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn run(
    config: &RiskGateConfig,
    decision: Option<String>,
    actor: Option<String>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<u8> {
    if !config.audit.enabled {
        eprintln!("ℹ️  Audit journal is disabled in the configuration.");
    }

    // Read the file even when journaling is disabled: it may hold older entries.
    let logger = AuditLogger::new(AuditConfig {
        enabled: true,
        ..config.audit.clone()
    });
    let filter = AuditFilter {
        decision_id: decision,
        actor,
        event_type: None,
        limit,
    };
    let events = logger
        .query(&filter)
        .with_context(|| format!("Failed to read {}", config.audit.path.display()))?;

    if events.is_empty() && format == OutputFormat::Text {
        println!("No audit events.");
    } else {
        print!("{}", render(&events, format)?);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use riskgate_audit::AuditEventType;

    fn event(id: &str) -> AuditEvent {
        AuditEvent::builder(AuditEventType::RiskRevoked, "bob", id)
            .at(Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap())
            .detail("reason", "superseded")
            .build()
    }

    #[test]
    fn test_render_text_lines() {
        let out = render(&[event("r-1"), event("r-2")], OutputFormat::Text).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[2025-07-01T09:30:00Z] risk.revoked decision=r-1"));
        assert!(lines[1].contains("reason=\"superseded\""));
    }

    #[test]
    fn test_render_json_is_ndjson() {
        let out = render(&[event("r-1")], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["eventType"], "risk.revoked");
        assert_eq!(value["decisionId"], "r-1");
    }
}
