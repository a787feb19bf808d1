//! Core types for the proteus liquidity agent.
//!
//! Everything in this crate is a pure value: token metadata and balances,
//! liquidity pair state, swap quotes, position snapshots, and the integer
//! arithmetic used to scale token amounts without precision loss.

/// Tokens, pairs, quotes and position snapshots.
pub mod entities;
/// Exact integer arithmetic on token amounts.
pub mod math;
/// Display-oriented value objects.
pub mod value_objects;

pub use ethers_core::types::{Address, H256, U256};
