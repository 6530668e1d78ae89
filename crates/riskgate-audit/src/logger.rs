//! Audit logger implementation.
//!
//! Provides the main `AuditLogger` type. The logger mirrors each event into
//! `tracing` and hands it to the configured storage backend.

use riskgate_core::AuditConfig;
use std::sync::Arc;

use crate::error::AuditError;
use crate::event::{AuditEvent, AuditEventType};
use crate::storage::{AuditStorage, FileStorage, NullStorage};

/// The main audit logger.
pub struct AuditLogger {
    config: AuditConfig,
    storage: Arc<dyn AuditStorage>,
}

impl AuditLogger {
    /// Create a new audit logger with the given configuration.
    pub fn new(config: AuditConfig) -> Self {
        let storage: Arc<dyn AuditStorage> = if config.enabled {
            Arc::new(FileStorage::new(config.path.clone()))
        } else {
            Arc::new(NullStorage::new())
        };

        Self { config, storage }
    }

    /// Create a logger with a custom storage backend.
    pub fn with_storage(config: AuditConfig, storage: Arc<dyn AuditStorage>) -> Self {
        Self { config, storage }
    }

    /// Create a disabled (no-op) logger.
    pub fn disabled() -> Self {
        Self {
            config: AuditConfig {
                enabled: false,
                ..Default::default()
            },
            storage: Arc::new(NullStorage::new()),
        }
    }

    /// Check if logging is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Log an audit event.
    pub fn log(&self, event: AuditEvent) -> Result<(), AuditError> {
        if !self.config.enabled {
            return Ok(());
        }

        // Also log to tracing for structured logging integration
        tracing::debug!(
            event_type = %event.event_type,
            decision_id = %event.decision_id,
            actor = %event.actor,
            "Audit event"
        );

        self.storage.append(&event)
    }

    /// Query audit events with filters, oldest first.
    pub fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events: Vec<AuditEvent> = self
            .storage
            .read_all()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();

        // Keep the most recent `limit` events.
        if let Some(limit) = filter.limit {
            if events.len() > limit {
                events.drain(..events.len() - limit);
            }
        }

        Ok(events)
    }

    /// Full history of one decision.
    pub fn history(&self, decision_id: &str) -> Result<Vec<AuditEvent>, AuditError> {
        self.query(&AuditFilter {
            decision_id: Some(decision_id.to_string()),
            ..Default::default()
        })
    }
}

/// Filter for querying audit events.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Filter by decision id.
    pub decision_id: Option<String>,
    /// Filter by actor.
    pub actor: Option<String>,
    /// Filter by event type.
    pub event_type: Option<AuditEventType>,
    /// Keep only the last `limit` matching events.
    pub limit: Option<usize>,
}

impl AuditFilter {
    fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(ref id) = self.decision_id {
            if &event.decision_id != id {
                return false;
            }
        }
        if let Some(ref actor) = self.actor {
            if &event.actor != actor {
                return false;
            }
        }
        if let Some(event_type) = self.event_type {
            if event.event_type != event_type {
                return false;
            }
        }
        true
    }
}
