//! Persisted lifecycle operations.
//!
//! Every mutation runs lock → load → apply → save → journal. The store write
//! is the commit point: if journaling fails afterwards the mutation stands and
//! the failure is reported in [`MutationOutcome::audit_warning`].

use chrono::{DateTime, Utc};
use riskgate_audit::{AuditEvent, AuditLogger};
use riskgate_core::{Decision, PolicyConfig, RiskGateConfig};
use riskgate_store::{DecisionStore, StoreFile};

use crate::error::LifecycleError;
use crate::lifecycle::{
    create_risk_acceptance, mark_remediated, renew_decision, revoke_decision, NewRiskAcceptance,
};

/// Result of a persisted mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// The created, successor or closed decision.
    pub decision: Decision,
    /// Set when the store was saved but the audit entry could not be written.
    pub audit_warning: Option<String>,
}

/// Lifecycle operations bound to a store file, an audit journal and a policy.
pub struct RiskLifecycle {
    file: StoreFile,
    audit: AuditLogger,
    policy: PolicyConfig,
}

impl RiskLifecycle {
    pub fn new(file: StoreFile, audit: AuditLogger, policy: PolicyConfig) -> Self {
        Self {
            file,
            audit,
            policy,
        }
    }

    /// Wire up store, journal and policy from a loaded configuration.
    pub fn from_config(config: &RiskGateConfig) -> Self {
        Self::new(
            StoreFile::new(config.store.path.clone()),
            AuditLogger::new(config.audit.clone()),
            config.policy.clone(),
        )
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn store_file(&self) -> &StoreFile {
        &self.file
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Read-only view of the store without taking the lock.
    pub fn snapshot(&self) -> Result<DecisionStore, LifecycleError> {
        Ok(self.file.load_snapshot()?)
    }

    /// Record a new risk acceptance and journal `risk.accepted`.
    pub fn create(
        &self,
        input: NewRiskAcceptance,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, LifecycleError> {
        self.mutate("accept", |store, policy| {
            let decision = create_risk_acceptance(store, input, now, policy)?;
            let event = AuditEvent::accepted(&decision, now);
            Ok((decision, event))
        })
    }

    /// Renew `id`; the outcome carries the successor.
    pub fn renew(
        &self,
        id: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, LifecycleError> {
        self.mutate("renew", |store, policy| {
            let successor = renew_decision(store, id, now, policy)?;
            let event = AuditEvent::renewed(&successor, actor, now);
            Ok((successor, event))
        })
    }

    pub fn revoke(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, LifecycleError> {
        self.mutate("revoke", |store, _| {
            let decision = revoke_decision(store, id, reason, actor, now)?;
            let event = AuditEvent::revoked(&decision, actor, reason, now);
            Ok((decision, event))
        })
    }

    pub fn remediate(
        &self,
        id: &str,
        note: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, LifecycleError> {
        self.mutate("remediate", |store, _| {
            let decision = mark_remediated(store, id, note, actor, now)?;
            let event = AuditEvent::remediated(&decision, actor, note, now);
            Ok((decision, event))
        })
    }

    fn mutate<F>(&self, action: &'static str, op: F) -> Result<MutationOutcome, LifecycleError>
    where
        F: FnOnce(&mut DecisionStore, &PolicyConfig) -> Result<(Decision, AuditEvent), LifecycleError>,
    {
        let _lock = self.file.lock()?;
        let mut store = self.file.load()?;

        let (decision, event) = op(&mut store, &self.policy)?;
        self.file.save(&store)?;

        tracing::info!(
            action,
            decision_id = %decision.id,
            status = %decision.status,
            expires_at = %decision.expires_at.to_rfc3339(),
            "Decision store updated"
        );

        let audit_warning = match self.audit.log(event) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(action, decision_id = %decision.id, error = %e, "Audit journal write failed");
                Some(e.to_string())
            }
        };

        Ok(MutationOutcome {
            decision,
            audit_warning,
        })
    }
}
