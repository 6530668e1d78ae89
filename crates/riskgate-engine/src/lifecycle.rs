//! Lifecycle operations on an in-memory [`DecisionStore`].
//!
//! These functions never touch the filesystem; see
//! [`RiskLifecycle`](crate::RiskLifecycle) for the persisted variants.

use chrono::{DateTime, Utc};
use riskgate_core::{new_decision_id, Decision, DecisionKind, DecisionStatus, PolicyConfig, Severity};
use riskgate_store::DecisionStore;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::LifecycleError;
use crate::policy::ExpiryPolicy;

/// Input for [`create_risk_acceptance`].
#[derive(Debug, Clone, Default)]
pub struct NewRiskAcceptance {
    /// Explicit id; generated when absent.
    pub id: Option<String>,
    pub risk_category: String,
    pub title: String,
    pub description: String,
    pub severity: Option<Severity>,
    pub accepted_by: String,
    pub follow_up_action: String,
    /// Overrides the severity-derived deadline.
    pub expires_at: Option<DateTime<Utc>>,
}

fn policy_expiry(
    policy: &PolicyConfig,
    severity: Severity,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, LifecycleError> {
    let expiry = ExpiryPolicy::from(policy);
    expiry.expiry_for(severity, now).ok_or_else(|| {
        LifecycleError::Validation(format!(
            "{} days for {severity} acceptances puts expiresAt out of range",
            expiry.days_for(severity)
        ))
    })
}

fn insert_new(store: &mut DecisionStore, decision: Decision) -> Result<(), LifecycleError> {
    let id = decision.id.clone();
    if !store.insert(decision) {
        return Err(LifecycleError::Validation(format!(
            "decision id '{id}' already exists"
        )));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), LifecycleError> {
    if value.trim().is_empty() {
        return Err(LifecycleError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Record a new risk acceptance.
///
/// `riskCategory`, `severity`, `acceptedBy` and `followUpAction` are
/// required. The deadline comes from the severity policy unless
/// `input.expires_at` overrides it.
pub fn create_risk_acceptance(
    store: &mut DecisionStore,
    input: NewRiskAcceptance,
    now: DateTime<Utc>,
    policy: &PolicyConfig,
) -> Result<Decision, LifecycleError> {
    require("riskCategory", &input.risk_category)?;
    let severity = input
        .severity
        .ok_or_else(|| LifecycleError::Validation("severity is required".to_string()))?;
    require("acceptedBy", &input.accepted_by)?;
    require("followUpAction", &input.follow_up_action)?;

    let id = match input.id {
        Some(id) => {
            require("id", &id)?;
            if store.contains(&id) {
                return Err(LifecycleError::Validation(format!(
                    "decision id '{id}' already exists"
                )));
            }
            id
        }
        None => new_decision_id(),
    };

    let expires_at = match input.expires_at {
        Some(at) if at <= now => {
            return Err(LifecycleError::Validation(format!(
                "expiresAt {} is not in the future",
                at.to_rfc3339()
            )));
        }
        Some(at) => at,
        None => policy_expiry(policy, severity, now)?,
    };

    let decision = Decision {
        id,
        kind: DecisionKind::RiskAcceptance,
        risk_category: input.risk_category.trim().to_string(),
        title: input.title,
        description: input.description,
        severity,
        status: DecisionStatus::Active,
        accepted_by: input.accepted_by.trim().to_string(),
        accepted_at: now,
        expires_at,
        follow_up_action: input.follow_up_action,
        renewed_from: None,
        renewal_count: 0,
        closed_at: None,
        closed_by: None,
        close_reason: None,
        extra: BTreeMap::new(),
    };

    insert_new(store, decision.clone())?;
    Ok(decision)
}

/// Most urgent first: severity descending, then earliest deadline, then id.
pub(crate) fn urgency_order(a: &Decision, b: &Decision) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then(a.expires_at.cmp(&b.expires_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Active risk acceptances whose deadline has passed.
pub fn list_expired_decisions(store: &DecisionStore, now: DateTime<Utc>) -> Vec<&Decision> {
    let mut expired: Vec<_> = store
        .risk_decisions()
        .into_iter()
        .filter(|d| d.is_expired(now))
        .collect();
    expired.sort_by(|a, b| urgency_order(a, b));
    expired
}

/// Active risk acceptances with `now <= expiresAt <= now + window_days`.
pub fn list_expiring_soon(
    store: &DecisionStore,
    now: DateTime<Utc>,
    window_days: u32,
) -> Vec<&Decision> {
    let mut expiring: Vec<_> = store
        .risk_decisions()
        .into_iter()
        .filter(|d| d.is_expiring_within(now, window_days))
        .collect();
    expiring.sort_by(|a, b| urgency_order(a, b));
    expiring
}

fn find_risk<'a>(store: &'a DecisionStore, id: &str) -> Result<&'a Decision, LifecycleError> {
    store
        .get(id)
        .filter(|d| d.is_risk_acceptance())
        .ok_or_else(|| LifecycleError::NotFound(id.to_string()))
}

fn ensure_active(decision: &Decision, action: &'static str) -> Result<(), LifecycleError> {
    if decision.status.is_frozen() {
        return Err(LifecycleError::InvalidState {
            id: decision.id.clone(),
            status: decision.status,
            action,
        });
    }
    Ok(())
}

/// Replace an active acceptance with a successor carrying a fresh deadline.
///
/// The successor copies the predecessor's classification, gets
/// `renewedFrom = id` and `renewalCount + 1`, and its deadline is computed
/// from `now`, not from the old deadline. The predecessor is frozen as
/// `renewed`. Renewing an active decision that has already expired is allowed.
pub fn renew_decision(
    store: &mut DecisionStore,
    id: &str,
    now: DateTime<Utc>,
    policy: &PolicyConfig,
) -> Result<Decision, LifecycleError> {
    let predecessor = find_risk(store, id)?;

    if predecessor.renewal_count >= policy.max_renewals {
        return Err(LifecycleError::RenewalLimit {
            id: id.to_string(),
            count: predecessor.renewal_count,
            limit: policy.max_renewals,
        });
    }
    ensure_active(predecessor, "renew")?;
    let expires_at = policy_expiry(policy, predecessor.severity, now)?;

    let successor = Decision {
        id: new_decision_id(),
        kind: DecisionKind::RiskAcceptance,
        risk_category: predecessor.risk_category.clone(),
        title: predecessor.title.clone(),
        description: predecessor.description.clone(),
        severity: predecessor.severity,
        status: DecisionStatus::Active,
        accepted_by: predecessor.accepted_by.clone(),
        accepted_at: now,
        expires_at,
        follow_up_action: predecessor.follow_up_action.clone(),
        renewed_from: Some(predecessor.id.clone()),
        renewal_count: predecessor.renewal_count + 1,
        closed_at: None,
        closed_by: None,
        close_reason: None,
        extra: BTreeMap::new(),
    };

    // Store the successor first: a rejected insert leaves the predecessor active.
    insert_new(store, successor.clone())?;
    if let Some(previous) = store.get_mut(id) {
        previous.status = DecisionStatus::Renewed;
        previous.closed_at = Some(now);
    }

    Ok(successor)
}

fn close(
    store: &mut DecisionStore,
    id: &str,
    status: DecisionStatus,
    action: &'static str,
    reason: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Decision, LifecycleError> {
    ensure_active(find_risk(store, id)?, action)?;

    let decision = store
        .get_mut(id)
        .ok_or_else(|| LifecycleError::NotFound(id.to_string()))?;
    decision.status = status;
    decision.closed_at = Some(now);
    decision.closed_by = Some(actor.to_string());
    decision.close_reason = Some(reason.to_string());

    Ok(decision.clone())
}

/// Withdraw an active acceptance. Terminal.
pub fn revoke_decision(
    store: &mut DecisionStore,
    id: &str,
    reason: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Decision, LifecycleError> {
    close(store, id, DecisionStatus::Revoked, "revoke", reason, actor, now)
}

/// Mark the accepted risk as fixed. Terminal.
pub fn mark_remediated(
    store: &mut DecisionStore,
    id: &str,
    note: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Decision, LifecycleError> {
    close(store, id, DecisionStatus::Remediated, "remediate", note, actor, now)
}
