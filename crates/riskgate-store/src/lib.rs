//! # riskgate-store
//!
//! Durable, versioned collection of [`Decision`](riskgate_core::Decision)
//! records.
//!
//! - [`DecisionStore`] is the in-memory, fully typed store passed by reference
//!   through every engine call.
//! - [`StoreFile`] loads and saves `decision-store.json`. Saves are atomic
//!   (temp file + rename) and mutations hold an exclusive [`StoreLock`].
//! - [`schema`] holds the persisted format and the single migration function
//!   that upgrades older schema versions at load time.

pub mod error;
pub mod file;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use file::{StoreFile, StoreLock};
pub use schema::{MigrationError, SchemaVersion, CURRENT_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION};
pub use store::DecisionStore;
