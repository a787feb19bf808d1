use super::contracts::{Erc20, MiniChefV2, Rewarder, UniswapV2Factory, UniswapV2Pair, UniswapV2Router02};
use crate::ledger::{
    AddLiquidityParams, LedgerError, LedgerReader, LedgerResult, LedgerWriter, SwapParams,
    TxReceipt,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::abi::Detokenize;
use ethers::contract::ContractCall;
use ethers::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Ledger backed by a JSON-RPC node and a local signing key.
pub struct EthersLedger {
    client: Arc<Client>,
}

impl EthersLedger {
    /// Connects to `endpoint` and binds `signing_key` to the node's chain id.
    pub async fn connect(endpoint: &str, signing_key: &str) -> Result<Self> {
        let provider =
            Provider::<Http>::try_from(endpoint).context("Invalid remote endpoint URL")?;
        let chain_id = provider
            .get_chainid()
            .await
            .context("Failed to query chain id")?;

        let wallet = signing_key
            .parse::<LocalWallet>()
            .context("Invalid signing key")?
            .with_chain_id(chain_id.as_u64());

        info!(
            chain_id = chain_id.as_u64(),
            account = ?wallet.address(),
            "Connected to ledger"
        );

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
        })
    }

    /// Submits `call`, waits for its receipt and checks the status.
    async fn confirm<D: Detokenize + Send + Sync>(
        &self,
        name: &'static str,
        call: ContractCall<Client, D>,
    ) -> LedgerResult<TxReceipt> {
        let pending = call
            .send()
            .await
            .map_err(|e| LedgerError::write(name, e))?;
        let tx_hash = pending.tx_hash();
        debug!(call = name, tx_hash = ?tx_hash, "Transaction submitted");

        let receipt = pending
            .await
            .map_err(|e| LedgerError::write(name, e))?
            .ok_or_else(|| {
                LedgerError::write(name, format!("transaction {tx_hash:?} dropped"))
            })?;

        if receipt.status != Some(U64::from(1)) {
            return Err(LedgerError::Reverted {
                call: name,
                tx_hash,
            });
        }

        info!(call = name, tx_hash = ?tx_hash, "Transaction confirmed");
        Ok(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
            gas_used: receipt.gas_used,
        })
    }

    fn erc20(&self, token: Address) -> Erc20<Client> {
        Erc20::new(token, self.client.clone())
    }

    fn pair(&self, pair: Address) -> UniswapV2Pair<Client> {
        UniswapV2Pair::new(pair, self.client.clone())
    }

    fn router(&self, router: Address) -> UniswapV2Router02<Client> {
        UniswapV2Router02::new(router, self.client.clone())
    }

    fn chef(&self, chef: Address) -> MiniChefV2<Client> {
        MiniChefV2::new(chef, self.client.clone())
    }
}

#[async_trait]
impl LedgerReader for EthersLedger {
    async fn native_balance(&self, owner: Address) -> LedgerResult<U256> {
        self.client
            .get_balance(owner, None)
            .await
            .map_err(|e| LedgerError::read(owner, "getBalance", e))
    }

    async fn token_symbol(&self, token: Address) -> LedgerResult<String> {
        self.erc20(token)
            .symbol()
            .call()
            .await
            .map_err(|e| LedgerError::read(token, "symbol", e))
    }

    async fn token_decimals(&self, token: Address) -> LedgerResult<u8> {
        self.erc20(token)
            .decimals()
            .call()
            .await
            .map_err(|e| LedgerError::read(token, "decimals", e))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> LedgerResult<U256> {
        self.erc20(token)
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| LedgerError::read(token, "balanceOf", e))
    }

    async fn pair_total_supply(&self, pair: Address) -> LedgerResult<U256> {
        self.pair(pair)
            .total_supply()
            .call()
            .await
            .map_err(|e| LedgerError::read(pair, "totalSupply", e))
    }

    async fn pair_token0(&self, pair: Address) -> LedgerResult<Address> {
        self.pair(pair)
            .token_0()
            .call()
            .await
            .map_err(|e| LedgerError::read(pair, "token0", e))
    }

    async fn pair_token1(&self, pair: Address) -> LedgerResult<Address> {
        self.pair(pair)
            .token_1()
            .call()
            .await
            .map_err(|e| LedgerError::read(pair, "token1", e))
    }

    async fn pair_reserves(&self, pair: Address) -> LedgerResult<(U256, U256)> {
        let (reserve0, reserve1, _timestamp) = self
            .pair(pair)
            .get_reserves()
            .call()
            .await
            .map_err(|e| LedgerError::read(pair, "getReserves", e))?;
        Ok((U256::from(reserve0), U256::from(reserve1)))
    }

    async fn router_factory(&self, router: Address) -> LedgerResult<Address> {
        self.router(router)
            .factory()
            .call()
            .await
            .map_err(|e| LedgerError::read(router, "factory", e))
    }

    async fn router_amount_out(
        &self,
        router: Address,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> LedgerResult<U256> {
        self.router(router)
            .get_amount_out(amount_in, reserve_in, reserve_out)
            .call()
            .await
            .map_err(|e| LedgerError::read(router, "getAmountOut", e))
    }

    async fn factory_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> LedgerResult<Address> {
        UniswapV2Factory::new(factory, self.client.clone())
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(|e| LedgerError::read(factory, "getPair", e))
    }

    async fn chef_lp_token(&self, chef: Address, pool_id: u64) -> LedgerResult<Address> {
        self.chef(chef)
            .lp_token(U256::from(pool_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(chef, "lpToken", e))
    }

    async fn chef_reward_token(&self, chef: Address) -> LedgerResult<Address> {
        self.chef(chef)
            .sushi()
            .call()
            .await
            .map_err(|e| LedgerError::read(chef, "SUSHI", e))
    }

    async fn chef_pending_reward(
        &self,
        chef: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256> {
        self.chef(chef)
            .pending_sushi(U256::from(pool_id), owner)
            .call()
            .await
            .map_err(|e| LedgerError::read(chef, "pendingSushi", e))
    }

    async fn chef_rewarder(&self, chef: Address, pool_id: u64) -> LedgerResult<Address> {
        self.chef(chef)
            .rewarder(U256::from(pool_id))
            .call()
            .await
            .map_err(|e| LedgerError::read(chef, "rewarder", e))
    }

    async fn chef_staked_amount(
        &self,
        chef: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256> {
        let (amount, _reward_debt) = self
            .chef(chef)
            .user_info(U256::from(pool_id), owner)
            .call()
            .await
            .map_err(|e| LedgerError::read(chef, "userInfo", e))?;
        Ok(amount)
    }

    async fn rewarder_token(&self, rewarder: Address) -> LedgerResult<Address> {
        Rewarder::new(rewarder, self.client.clone())
            .reward_token()
            .call()
            .await
            .map_err(|e| LedgerError::read(rewarder, "rewardToken", e))
    }

    async fn rewarder_pending(
        &self,
        rewarder: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256> {
        Rewarder::new(rewarder, self.client.clone())
            .pending_token(U256::from(pool_id), owner)
            .call()
            .await
            .map_err(|e| LedgerError::read(rewarder, "pendingToken", e))
    }
}

#[async_trait]
impl LedgerWriter for EthersLedger {
    fn account(&self) -> Address {
        self.client.address()
    }

    async fn harvest(&self, chef: Address, pool_id: u64, to: Address) -> LedgerResult<TxReceipt> {
        let call = self.chef(chef).harvest(U256::from(pool_id), to);
        self.confirm("harvest", call).await
    }

    async fn swap_exact_tokens_for_native(
        &self,
        router: Address,
        params: SwapParams,
    ) -> LedgerResult<TxReceipt> {
        let call = self.router(router).swap_exact_tokens_for_eth(
            params.amount_in,
            params.amount_out_min,
            params.path,
            params.to,
            params.deadline,
        );
        self.confirm("swapExactTokensForETH", call).await
    }

    async fn add_liquidity_native(
        &self,
        router: Address,
        params: AddLiquidityParams,
    ) -> LedgerResult<TxReceipt> {
        let call = self
            .router(router)
            .add_liquidity_eth(
                params.token,
                params.amount_token_desired,
                params.amount_token_min,
                params.amount_native_min,
                params.to,
                params.deadline,
            )
            .value(params.value);
        self.confirm("addLiquidityETH", call).await
    }

    async fn deposit(
        &self,
        chef: Address,
        pool_id: u64,
        amount: U256,
        to: Address,
    ) -> LedgerResult<TxReceipt> {
        let call = self.chef(chef).deposit(U256::from(pool_id), amount, to);
        self.confirm("deposit", call).await
    }
}
