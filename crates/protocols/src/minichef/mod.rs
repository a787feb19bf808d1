//! MiniChef reward program reads.
//!
//! MiniChefV2 holds staked pool tokens, accrues its own reward token
//! (`SUSHI()`) and delegates a second reward stream to a per-pool rewarder.

/// Reader for staked positions and pending rewards.
pub mod reader;

pub use reader::{ChefPosition, ChefReader};
