//! EVM binding of the ledger traits.
//!
//! Talks JSON-RPC to a node through `ethers`, signs with a local key and
//! waits for every transaction receipt before returning.

/// Client implementing the ledger traits.
pub mod client;
/// Contract bindings generated from human-readable ABIs.
pub mod contracts;

pub use client::EthersLedger;
