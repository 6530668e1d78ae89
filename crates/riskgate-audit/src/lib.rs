//! # riskgate-audit
//!
//! Append-only audit journal for risk acceptance lifecycle mutations.
//!
//! Every mutation performed by the lifecycle engine appends exactly one
//! [`AuditEvent`] as a single JSON line (NDJSON). Lines are never rewritten or
//! reordered.
//!
//! ## Event Format
//!
//! ```json
//! {"timestamp":"2025-01-01T00:00:00Z","actor":"alice","eventType":"risk.accepted","decisionId":"...","details":{"severity":"high"}}
//! ```
//!
//! ## Event Types
//!
//! | Event Type | Description |
//! |------------|-------------|
//! | `risk.accepted` | A risk acceptance was created |
//! | `risk.renewed` | A successor decision replaced an active one |
//! | `risk.revoked` | An acceptance was withdrawn |
//! | `risk.remediated` | The underlying risk was fixed |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use riskgate_audit::{AuditEvent, AuditEventType, AuditLogger};
//! use riskgate_core::AuditConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = AuditLogger::new(AuditConfig::default());
//!
//! let event = AuditEvent::builder(AuditEventType::RiskRevoked, "alice", "d-123")
//!     .detail("reason", "vendor patched")
//!     .build();
//! logger.log(event)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod logger;
pub mod storage;

pub use error::AuditError;
pub use event::{AuditEvent, AuditEventBuilder, AuditEventType};
pub use logger::{AuditFilter, AuditLogger};
pub use storage::{AuditStorage, FileStorage, NullStorage};
