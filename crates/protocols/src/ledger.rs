//! Collaborator traits for reading from and writing to the ledger.
//!
//! The traits are typed per contract call rather than exposing raw ABI
//! encoding, so the rest of the workspace never sees calldata. Every writer
//! method blocks until the transaction is confirmed.

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::fmt::Display;
use thiserror::Error;

/// Result alias for ledger calls.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failure of a ledger call.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// A view call failed (transport error, missing contract, bad return data).
    #[error("read `{call}` on {target:?} failed: {message}")]
    Read {
        target: Address,
        call: &'static str,
        message: String,
    },
    /// The factory has no pair registered for the two tokens.
    #[error("no pair registered for {token_a:?}/{token_b:?}")]
    PairNotFound { token_a: Address, token_b: Address },
    /// A state-changing call could not be submitted or confirmed.
    #[error("`{call}` was rejected: {message}")]
    Write { call: &'static str, message: String },
    /// A state-changing call was mined but reverted.
    #[error("`{call}` reverted in transaction {tx_hash:?}")]
    Reverted { call: &'static str, tx_hash: H256 },
}

impl LedgerError {
    pub fn read(target: Address, call: &'static str, error: impl Display) -> Self {
        Self::Read {
            target,
            call,
            message: error.to_string(),
        }
    }

    pub fn write(call: &'static str, error: impl Display) -> Self {
        Self::Write {
            call,
            message: error.to_string(),
        }
    }

    /// Whether the failure happened on the read side.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::PairNotFound { .. })
    }

    /// Whether a state-changing call was rejected or reverted.
    pub fn is_write(&self) -> bool {
        !self.is_read()
    }

    /// Name of the contract call that failed, if any.
    pub fn call(&self) -> Option<&'static str> {
        match self {
            Self::Read { call, .. } | Self::Write { call, .. } | Self::Reverted { call, .. } => {
                Some(*call)
            }
            Self::PairNotFound { .. } => None,
        }
    }
}

/// Confirmation of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

/// Parameters of `swapExactTokensForETH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub amount_in: U256,
    /// Minimum native output accepted.
    pub amount_out_min: U256,
    /// Token path; the last hop must be the wrapped native token.
    pub path: Vec<Address>,
    pub to: Address,
    /// Unix timestamp after which the router rejects the swap.
    pub deadline: U256,
}

/// Parameters of `addLiquidityETH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token: Address,
    pub amount_token_desired: U256,
    pub amount_token_min: U256,
    pub amount_native_min: U256,
    pub to: Address,
    pub deadline: U256,
    /// Native currency attached to the call.
    pub value: U256,
}

/// View calls against the ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Native currency balance of `owner`.
    async fn native_balance(&self, owner: Address) -> LedgerResult<U256>;

    async fn token_symbol(&self, token: Address) -> LedgerResult<String>;
    async fn token_decimals(&self, token: Address) -> LedgerResult<u8>;
    async fn token_balance(&self, token: Address, owner: Address) -> LedgerResult<U256>;

    async fn pair_total_supply(&self, pair: Address) -> LedgerResult<U256>;
    async fn pair_token0(&self, pair: Address) -> LedgerResult<Address>;
    async fn pair_token1(&self, pair: Address) -> LedgerResult<Address>;
    /// `getReserves()`, as `(reserve0, reserve1)`.
    async fn pair_reserves(&self, pair: Address) -> LedgerResult<(U256, U256)>;

    async fn router_factory(&self, router: Address) -> LedgerResult<Address>;
    /// The router's canonical `getAmountOut(amountIn, reserveIn, reserveOut)`.
    async fn router_amount_out(
        &self,
        router: Address,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> LedgerResult<U256>;
    /// `getPair(tokenA, tokenB)`; the zero address when no pair exists.
    async fn factory_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> LedgerResult<Address>;

    async fn chef_lp_token(&self, chef: Address, pool_id: u64) -> LedgerResult<Address>;
    /// The chef's own reward token (`SUSHI()`).
    async fn chef_reward_token(&self, chef: Address) -> LedgerResult<Address>;
    async fn chef_pending_reward(
        &self,
        chef: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256>;
    async fn chef_rewarder(&self, chef: Address, pool_id: u64) -> LedgerResult<Address>;
    /// Pool tokens `owner` has deposited (`userInfo(pid, owner).amount`).
    async fn chef_staked_amount(
        &self,
        chef: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256>;

    async fn rewarder_token(&self, rewarder: Address) -> LedgerResult<Address>;
    async fn rewarder_pending(
        &self,
        rewarder: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256>;
}

/// State-changing calls, signed by the account returned from [`LedgerWriter::account`].
#[async_trait]
pub trait LedgerWriter: LedgerReader {
    /// The signing account.
    fn account(&self) -> Address;

    async fn harvest(&self, chef: Address, pool_id: u64, to: Address) -> LedgerResult<TxReceipt>;

    async fn swap_exact_tokens_for_native(
        &self,
        router: Address,
        params: SwapParams,
    ) -> LedgerResult<TxReceipt>;

    async fn add_liquidity_native(
        &self,
        router: Address,
        params: AddLiquidityParams,
    ) -> LedgerResult<TxReceipt>;

    async fn deposit(
        &self,
        chef: Address,
        pool_id: u64,
        amount: U256,
        to: Address,
    ) -> LedgerResult<TxReceipt>;
}
