//! Scoring ledger for Model UN committee marking.
//!
//! Delegates are scored against a configurable rubric, ranked by final total,
//! and awarded tier by tier. The ledger persists as JSON and exports to CSV.

pub mod config;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod output;
pub mod scoring;
