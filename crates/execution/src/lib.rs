//! Roll engine for a staked liquidity position.
//!
//! This crate provides:
//! - The roll configuration (pool identities and tolerances)
//! - Concurrent position snapshots for the balance report
//! - The five-stage reward roll pipeline
//! - A journal of stage transitions for resuming aborted rolls

/// Prelude module for convenient imports.
pub mod prelude;

/// Roll configuration.
pub mod config;
/// Roll lifecycle tracking.
pub mod lifecycle;
/// Position snapshots.
pub mod snapshot;
/// Strategy execution.
pub mod strategy;
