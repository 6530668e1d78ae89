//! `riskgate list` and `riskgate show`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use riskgate_core::{Decision, RiskGateConfig};
use riskgate_engine::{list_expired_decisions, list_expiring_soon};
use riskgate_store::{DecisionStore, StoreFile};
use serde::Serialize;
use std::fmt::Write as _;

use crate::OutputFormat;

/// Which decisions `riskgate list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Expired,
    /// Expiring within this many days.
    Expiring(u32),
}

/// A decision plus its clock-dependent view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecisionView<'a> {
    #[serde(flatten)]
    decision: &'a Decision,
    effective_status: String,
    days_remaining: i64,
}

impl<'a> DecisionView<'a> {
    fn new(decision: &'a Decision, now: DateTime<Utc>) -> Self {
        Self {
            decision,
            effective_status: decision.effective_status(now).to_string(),
            days_remaining: decision.days_remaining(now),
        }
    }
}

fn load(config: &RiskGateConfig) -> Result<DecisionStore> {
    StoreFile::new(config.store.path.clone())
        .load_snapshot()
        .context("Failed to load decision store")
}

/// Decisions selected by `filter`, most urgent first for the expiry filters
/// and in store order otherwise.
pub fn select(store: &DecisionStore, filter: ListFilter, now: DateTime<Utc>) -> Vec<&Decision> {
    match filter {
        ListFilter::All => store.risk_decisions(),
        ListFilter::Expired => list_expired_decisions(store, now),
        ListFilter::Expiring(days) => list_expiring_soon(store, now, days),
    }
}

fn render_row(out: &mut String, decision: &Decision, now: DateTime<Utc>) {
    let _ = writeln!(
        out,
        "{:<38} {:<9} {:<11} {:>5}d  {}",
        decision.id,
        decision.severity.as_str(),
        decision.effective_status(now).to_string(),
        decision.days_remaining(now),
        decision.title,
    );
}

pub fn render_table(decisions: &[&Decision], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<38} {:<9} {:<11} {:>6}  {}",
        "ID", "SEVERITY", "STATUS", "LEFT", "TITLE"
    );
    let _ = writeln!(out, "{}", "─".repeat(80));
    for decision in decisions {
        render_row(&mut out, decision, now);
    }
    out
}

pub fn list(config: &RiskGateConfig, filter: ListFilter, format: OutputFormat) -> Result<u8> {
    let store = load(config)?;
    let now = Utc::now();
    let decisions = select(&store, filter, now);

    match format {
        OutputFormat::Text => {
            if decisions.is_empty() {
                println!("No matching risk acceptances.");
            } else {
                print!("{}", render_table(&decisions, now));
            }
        }
        OutputFormat::Json => {
            let views: Vec<_> = decisions.iter().map(|d| DecisionView::new(d, now)).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
    }
    Ok(0)
}

/// Detailed view of one decision: fields, lineage back to the original
/// acceptance, and the successor if it was renewed.
pub fn render_detail(store: &DecisionStore, decision: &Decision, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", decision.id, String::from(decision.kind.clone()));
    let _ = writeln!(out, "  title:       {}", decision.title);
    let _ = writeln!(out, "  category:    {}", decision.risk_category);
    let _ = writeln!(out, "  severity:    {}", decision.severity);
    let _ = writeln!(out, "  status:      {}", decision.effective_status(now));
    let _ = writeln!(out, "  accepted:    {} by {}", decision.accepted_at.to_rfc3339(), decision.accepted_by);
    let _ = writeln!(
        out,
        "  expires:     {} ({} day(s))",
        decision.expires_at.to_rfc3339(),
        decision.days_remaining(now)
    );
    let _ = writeln!(out, "  follow-up:   {}", decision.follow_up_action);
    if !decision.description.is_empty() {
        let _ = writeln!(out, "  description: {}", decision.description);
    }
    let _ = writeln!(out, "  renewals:    {}", decision.renewal_count);
    if let Some(closed_at) = decision.closed_at {
        let by = decision.closed_by.as_deref().unwrap_or("-");
        let _ = writeln!(out, "  closed:      {} by {}", closed_at.to_rfc3339(), by);
    }
    if let Some(ref reason) = decision.close_reason {
        let _ = writeln!(out, "  reason:      {reason}");
    }

    let lineage = store.lineage(&decision.id);
    if lineage.len() > 1 {
        let _ = writeln!(out, "\nLineage (newest first):");
        for ancestor in lineage {
            let _ = writeln!(
                out,
                "  {} [{}] accepted {}",
                ancestor.id,
                ancestor.status,
                ancestor.accepted_at.format("%Y-%m-%d")
            );
        }
    }
    if let Some(successor) = store.successor_of(&decision.id) {
        let _ = writeln!(out, "\nRenewed by: {}", successor.id);
    }
    out
}

pub fn show(config: &RiskGateConfig, id: &str, format: OutputFormat) -> Result<u8> {
    let store = load(config)?;
    let Some(decision) = store.get(id) else {
        bail!("Decision not found: {id}");
    };
    let now = Utc::now();

    match format {
        OutputFormat::Text => print!("{}", render_detail(&store, decision, now)),
        OutputFormat::Json => {
            let lineage: Vec<_> = store
                .lineage(id)
                .into_iter()
                .map(|d| DecisionView::new(d, now))
                .collect();
            println!("{}", serde_json::to_string_pretty(&lineage)?);
        }
    }
    Ok(0)
}
