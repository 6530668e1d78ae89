//! Error types for lifecycle operations.

use riskgate_core::DecisionStatus;
use riskgate_store::StoreError;
use thiserror::Error;

/// Errors returned by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A required field is missing or a value is out of range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No risk acceptance with this id.
    #[error("risk acceptance not found: {0}")]
    NotFound(String),

    /// The decision is frozen and cannot take this transition.
    #[error("cannot {action} decision {id}: it is {status}, only active decisions can change")]
    InvalidState {
        id: String,
        status: DecisionStatus,
        action: &'static str,
    },

    /// The renewal budget is exhausted.
    #[error(
        "decision {id} has reached the renewal limit ({count}/{limit}); revoke or remediate it instead"
    )]
    RenewalLimit { id: String, count: u32, limit: u32 },

    /// Loading or saving the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
