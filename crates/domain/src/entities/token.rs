use crate::value_objects::amount::Amount;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata of an ERC-20 token as resolved from its contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Attaches an amount, expressed in the token's smallest unit.
    #[must_use]
    pub fn with_amount(self, amount: U256) -> TokenBalance {
        TokenBalance { info: self, amount }
    }
}

/// A token amount together with the metadata needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    #[serde(flatten)]
    pub info: TokenInfo,
    pub amount: U256,
}

impl TokenBalance {
    pub fn new(info: TokenInfo, amount: U256) -> Self {
        Self { info, amount }
    }

    pub fn address(&self) -> Address {
        self.info.address
    }

    pub fn symbol(&self) -> &str {
        &self.info.symbol
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn display_amount(&self) -> Amount {
        Amount::new(self.amount, self.info.decimals)
    }
}

impl fmt::Display for TokenBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.info.symbol, self.display_amount())
    }
}
