use crate::entities::token::TokenBalance;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Read-only view of an account's holdings around one staked liquidity pool.
///
/// Rebuilt from the ledger on every invocation and never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub owner: Address,
    /// Native currency balance, in wei.
    pub native_balance: U256,
    /// Balances of the tracked tokens, in configuration order.
    pub erc20_balances: Vec<TokenBalance>,
    /// The owner's proportional claim on each reserve of the staked pair.
    pub liquidity_share: (TokenBalance, TokenBalance),
    /// Rewards accrued but not yet harvested.
    pub pending_rewards: Vec<TokenBalance>,
    /// Reward tokens still held by the rewarder contract.
    pub rewarder_balance: TokenBalance,
}
