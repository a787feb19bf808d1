//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use proteus_protocols::prelude::*;
//! ```

pub use crate::evm::EthersLedger;
pub use crate::ledger::{
    AddLiquidityParams, LedgerError, LedgerReader, LedgerResult, LedgerWriter, SwapParams,
    TxReceipt,
};
pub use crate::minichef::{ChefPosition, ChefReader};
pub use crate::uniswap_v2::{PairReader, QuoteEngine, TokenResolver};
