//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use proteus_execution::prelude::*;
//! ```

// Config
pub use crate::config::{ConfigError, RollConfig};

// Lifecycle
pub use crate::lifecycle::{RollEvent, RollEventKind, RollJournal};

// Snapshot
pub use crate::snapshot::{SnapshotBuilder, SnapshotError};

// Strategy
pub use crate::strategy::{
    ParseStageError, RollContext, RollError, RollObserver, RollPipeline, RollReport, RollStage,
    SkipReason, StageDetail, StageOutcome, StageRecord,
};
