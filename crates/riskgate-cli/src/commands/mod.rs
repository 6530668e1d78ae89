//! CLI command implementations for riskgate.

pub mod audit;
pub mod check;
pub mod decision;
pub mod list;
