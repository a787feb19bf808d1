use crate::entities::token::TokenBalance;
use crate::math::MathError;
use crate::math::ratio::scale_by_ratio;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// State of a Uniswap-V2 style liquidity pair.
///
/// `token0` carries `reserves[0]` and `token1` carries `reserves[1]`; the
/// ordering is the pair contract's own (address-sorted by the factory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairState {
    pub address: Address,
    /// Outstanding pool tokens.
    pub total_supply: U256,
    pub token0: TokenBalance,
    pub token1: TokenBalance,
}

impl PairState {
    /// Returns `(reserve_in, reserve_out)` for a trade selling `input`.
    ///
    /// The direction is chosen by token identity, never by position.
    pub fn reserves_for(&self, input: Address) -> (U256, U256) {
        if input == self.token0.address() {
            (self.token0.amount, self.token1.amount)
        } else {
            (self.token1.amount, self.token0.amount)
        }
    }

    /// Computes the reserves claimable by `owner_amount` pool tokens.
    ///
    /// Each share is `round_half_up(reserve * owner_amount / total_supply)`
    /// evaluated exactly. An empty pool yields zero shares.
    pub fn liquidity_share(
        &self,
        owner_amount: U256,
    ) -> Result<(TokenBalance, TokenBalance), MathError> {
        if self.total_supply.is_zero() {
            return Ok((
                self.token0.info.clone().with_amount(U256::zero()),
                self.token1.info.clone().with_amount(U256::zero()),
            ));
        }

        let share0 = scale_by_ratio(owner_amount, self.total_supply, self.token0.amount)?;
        let share1 = scale_by_ratio(owner_amount, self.total_supply, self.token1.amount)?;

        Ok((
            self.token0.info.clone().with_amount(share0),
            self.token1.info.clone().with_amount(share1),
        ))
    }
}
