//! Uniswap-V2 compatible AMM reads (SushiSwap on Arbitrum).
//!
//! - Resolve token metadata and balances
//! - Read pair supply and reserves
//! - Quote swaps through the router's `getAmountOut`

/// Pair state reader.
pub mod pair_reader;
/// Constant-product quotes.
pub mod quote;
/// Token metadata resolver.
pub mod token_resolver;

pub use pair_reader::PairReader;
pub use quote::QuoteEngine;
pub use token_resolver::TokenResolver;
