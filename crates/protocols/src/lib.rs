//! Ledger access for the proteus agent.
//!
//! This crate provides:
//! - The `LedgerReader` / `LedgerWriter` collaborator traits
//! - An `ethers`-backed implementation talking JSON-RPC to an EVM node
//! - Uniswap-V2 readers: token metadata, pair state and swap quotes
//! - MiniChef reward program reads

/// Prelude module for convenient imports.
pub mod prelude;

/// EVM binding of the ledger traits.
pub mod evm;
/// Collaborator traits and error types.
pub mod ledger;
/// MiniChef reward program reads.
pub mod minichef;
/// Uniswap-V2 compatible AMM reads.
pub mod uniswap_v2;

/// In-memory ledger for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
