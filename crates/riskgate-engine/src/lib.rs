//! # riskgate-engine
//!
//! The risk acceptance lifecycle and the gate evaluator.
//!
//! ## Lifecycle
//!
//! ```text
//!            renew (renewalCount < maxRenewals)
//!   active ─────────────────────────────────────▶ renewed   (+ new active successor)
//!     │ revoke
//!     ├──────────▶ revoked
//!     │ remediate
//!     └──────────▶ remediated
//! ```
//!
//! `renewed`, `revoked` and `remediated` are frozen. `expired` is not a state:
//! it is an `active` decision whose deadline has passed, and it only changes
//! which verdict the gate produces.
//!
//! The functions in [`lifecycle`] are pure transformations of a
//! [`DecisionStore`](riskgate_store::DecisionStore). [`RiskLifecycle`] wraps
//! them with locking, persistence and audit journaling.
//!
//! ## Gate
//!
//! [`gate::evaluate`] turns store contents and the current time into a
//! [`Verdict`]: `pass`, `warn` or `block`.

pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod policy;
pub mod service;

pub use error::LifecycleError;
pub use gate::{evaluate, Condition, GateItem, GateMode, GateResult, Verdict};
pub use lifecycle::{
    create_risk_acceptance, list_expired_decisions, list_expiring_soon, mark_remediated,
    renew_decision, revoke_decision, NewRiskAcceptance,
};
pub use policy::{default_expiry_for_severity, ExpiryPolicy};
pub use service::{MutationOutcome, RiskLifecycle};
