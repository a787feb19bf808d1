use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Output of a constant-product swap quote.
///
/// Both amounts are in the smallest unit of their respective token and are
/// only valid for the reserves observed when the quote was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out: U256,
}

impl Quote {
    pub fn new(amount_in: U256, amount_out: U256) -> Self {
        Self {
            amount_in,
            amount_out,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.amount_in.is_zero()
    }
}
