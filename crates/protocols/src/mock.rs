//! In-memory ledger for tests.
//!
//! Every call is recorded with a global sequence number. Writes simulate
//! their on-chain effects: harvests credit pending rewards, swaps and
//! liquidity adds move balances through the constant-product formula, and
//! deposits stake pool tokens. Calls named with [`MockLedger::fail_on`]
//! fail instead.

use crate::ledger::{
    AddLiquidityParams, LedgerError, LedgerReader, LedgerResult, LedgerWriter, SwapParams,
    TxReceipt,
};
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use parking_lot::Mutex;
use proteus_domain::math::constant_product::{V2_FEE_BPS, get_amount_out};
use std::collections::{HashMap, HashSet};

/// Kind of a recorded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
    /// Inserted by the test through [`MockLedger::mark`].
    Marker,
}

/// One recorded ledger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub seq: u64,
    pub kind: CallKind,
    pub name: String,
}

/// A constant-product pair held by the mock.
#[derive(Debug, Clone)]
pub struct MockPair {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
}

impl MockPair {
    pub fn new(
        token0: Address,
        token1: Address,
        reserve0: U256,
        reserve1: U256,
        total_supply: U256,
    ) -> Self {
        Self {
            token0,
            token1,
            reserve0,
            reserve1,
            total_supply,
        }
    }

    fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    fn other(&self, token: Address) -> Address {
        if self.token0 == token {
            self.token1
        } else {
            self.token0
        }
    }

    fn reserve_of(&self, token: Address) -> U256 {
        if self.token0 == token {
            self.reserve0
        } else {
            self.reserve1
        }
    }

    fn reserve_of_mut(&mut self, token: Address) -> &mut U256 {
        if self.token0 == token {
            &mut self.reserve0
        } else {
            &mut self.reserve1
        }
    }
}

/// A MiniChef with a single pool and its rewarder.
#[derive(Debug, Clone)]
pub struct MockChef {
    pub address: Address,
    pub pool_id: u64,
    pub lp_token: Address,
    pub reward_token: Address,
    pub rewarder: Address,
    pub rewarder_token: Address,
    staked: HashMap<Address, U256>,
    pending_reward: HashMap<Address, U256>,
    pending_rewarder: HashMap<Address, U256>,
}

impl MockChef {
    pub fn new(
        address: Address,
        pool_id: u64,
        lp_token: Address,
        reward_token: Address,
        rewarder: Address,
        rewarder_token: Address,
    ) -> Self {
        Self {
            address,
            pool_id,
            lp_token,
            reward_token,
            rewarder,
            rewarder_token,
            staked: HashMap::new(),
            pending_reward: HashMap::new(),
            pending_rewarder: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_staked(mut self, owner: Address, amount: U256) -> Self {
        self.staked.insert(owner, amount);
        self
    }

    /// Sets the chef's own pending reward and the rewarder's pending reward.
    #[must_use]
    pub fn with_pending(mut self, owner: Address, reward: U256, rewarder_reward: U256) -> Self {
        self.pending_reward.insert(owner, reward);
        self.pending_rewarder.insert(owner, rewarder_reward);
        self
    }
}

#[derive(Default)]
struct MockState {
    native: HashMap<Address, U256>,
    reported_native: HashMap<Address, U256>,
    tokens: HashMap<Address, (String, u8)>,
    balances: HashMap<(Address, Address), U256>,
    pairs: HashMap<Address, MockPair>,
    routers: HashMap<Address, Address>,
    chef: Option<MockChef>,
    failing: HashSet<String>,
    calls: Vec<LedgerCall>,
    next_seq: u64,
}

impl MockState {
    fn record(&mut self, kind: CallKind, name: &str) -> u64 {
        self.next_seq += 1;
        self.calls.push(LedgerCall {
            seq: self.next_seq,
            kind,
            name: name.to_string(),
        });
        self.next_seq
    }

    fn read(&mut self, target: Address, call: &'static str) -> LedgerResult<()> {
        self.record(CallKind::Read, call);
        if self.failing.contains(call) {
            return Err(LedgerError::read(target, call, "injected failure"));
        }
        Ok(())
    }

    fn write(&mut self, call: &'static str) -> LedgerResult<u64> {
        let seq = self.record(CallKind::Write, call);
        if self.failing.contains(call) {
            return Err(LedgerError::Reverted {
                call,
                tx_hash: H256::from_low_u64_be(seq),
            });
        }
        Ok(seq)
    }

    fn is_erc20(&self, token: Address) -> bool {
        self.tokens.contains_key(&token) || self.pairs.contains_key(&token)
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn credit(&mut self, token: Address, owner: Address, amount: U256) {
        *self.balances.entry((token, owner)).or_default() += amount;
    }

    fn debit(&mut self, token: Address, owner: Address, amount: U256) -> bool {
        let balance = self.balances.entry((token, owner)).or_default();
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }

    fn pair(&self, pair: Address, call: &'static str) -> LedgerResult<&MockPair> {
        self.pairs
            .get(&pair)
            .ok_or_else(|| LedgerError::read(pair, call, "no pair at address"))
    }

    fn chef(&self, chef: Address, pool_id: u64, call: &'static str) -> LedgerResult<&MockChef> {
        match &self.chef {
            Some(state) if state.address == chef && state.pool_id == pool_id => Ok(state),
            _ => Err(LedgerError::read(chef, call, "unknown chef pool")),
        }
    }

    fn find_pair(&self, token_a: Address, token_b: Address) -> Option<Address> {
        self.pairs
            .iter()
            .find(|(_, pair)| pair.contains(token_a) && pair.contains(token_b) && token_a != token_b)
            .map(|(address, _)| *address)
    }
}

fn receipt(seq: u64) -> TxReceipt {
    TxReceipt {
        tx_hash: H256::from_low_u64_be(seq),
        block_number: Some(seq),
        gas_used: Some(U256::from(21_000)),
    }
}

fn reverted(call: &'static str, seq: u64) -> LedgerError {
    LedgerError::Reverted {
        call,
        tx_hash: H256::from_low_u64_be(seq),
    }
}

/// In-memory ledger signing as `account`.
pub struct MockLedger {
    account: Address,
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            state: Mutex::new(MockState::default()),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.state
            .get_mut()
            .tokens
            .insert(token, (symbol.to_string(), decimals));
        self
    }

    #[must_use]
    pub fn with_balance(mut self, token: Address, owner: Address, amount: U256) -> Self {
        self.state.get_mut().balances.insert((token, owner), amount);
        self
    }

    #[must_use]
    pub fn with_native(mut self, owner: Address, amount: U256) -> Self {
        self.state.get_mut().native.insert(owner, amount);
        self
    }

    /// Makes native balance reads for `owner` always report `amount`,
    /// whatever the simulated balance is.
    #[must_use]
    pub fn with_reported_native(mut self, owner: Address, amount: U256) -> Self {
        self.state.get_mut().reported_native.insert(owner, amount);
        self
    }

    #[must_use]
    pub fn with_pair(mut self, pair: Address, state: MockPair) -> Self {
        self.state.get_mut().pairs.insert(pair, state);
        self
    }

    /// Registers a router and the factory it reports.
    #[must_use]
    pub fn with_router(mut self, router: Address, factory: Address) -> Self {
        self.state.get_mut().routers.insert(router, factory);
        self
    }

    #[must_use]
    pub fn with_chef(mut self, chef: MockChef) -> Self {
        self.state.get_mut().chef = Some(chef);
        self
    }

    /// Makes every subsequent call named `call` fail.
    pub fn fail_on(&self, call: &str) {
        self.state.lock().failing.insert(call.to_string());
    }

    /// Inserts a marker into the call log and returns its sequence number.
    pub fn mark(&self, label: &str) -> u64 {
        self.state.lock().record(CallKind::Marker, label)
    }

    /// All recorded entries, markers included.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state.lock().calls.clone()
    }

    /// Number of ledger calls, markers excluded.
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.kind != CallKind::Marker)
            .count()
    }

    pub fn calls_named(&self, name: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.kind != CallKind::Marker && call.name == name)
            .count()
    }

    /// Names of the state-changing calls, in submission order.
    pub fn writes(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.kind == CallKind::Write)
            .map(|call| call.name.clone())
            .collect()
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.state.lock().balance(token, owner)
    }

    pub fn native(&self, owner: Address) -> U256 {
        self.state
            .lock()
            .native
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn staked(&self, owner: Address) -> U256 {
        self.state
            .lock()
            .chef
            .as_ref()
            .and_then(|chef| chef.staked.get(&owner).copied())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn native_balance(&self, owner: Address) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(owner, "getBalance")?;
        let reported = state
            .reported_native
            .get(&owner)
            .or_else(|| state.native.get(&owner));
        Ok(reported.copied().unwrap_or_default())
    }

    async fn token_symbol(&self, token: Address) -> LedgerResult<String> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(token, "symbol")?;
        state
            .tokens
            .get(&token)
            .map(|(symbol, _)| symbol.clone())
            .ok_or_else(|| LedgerError::read(token, "symbol", "no contract at address"))
    }

    async fn token_decimals(&self, token: Address) -> LedgerResult<u8> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(token, "decimals")?;
        state
            .tokens
            .get(&token)
            .map(|(_, decimals)| *decimals)
            .ok_or_else(|| LedgerError::read(token, "decimals", "no contract at address"))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(token, "balanceOf")?;
        if !state.is_erc20(token) {
            return Err(LedgerError::read(token, "balanceOf", "no contract at address"));
        }
        Ok(state.balance(token, owner))
    }

    async fn pair_total_supply(&self, pair: Address) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(pair, "totalSupply")?;
        Ok(state.pair(pair, "totalSupply")?.total_supply)
    }

    async fn pair_token0(&self, pair: Address) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(pair, "token0")?;
        Ok(state.pair(pair, "token0")?.token0)
    }

    async fn pair_token1(&self, pair: Address) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(pair, "token1")?;
        Ok(state.pair(pair, "token1")?.token1)
    }

    async fn pair_reserves(&self, pair: Address) -> LedgerResult<(U256, U256)> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(pair, "getReserves")?;
        let pair = state.pair(pair, "getReserves")?;
        Ok((pair.reserve0, pair.reserve1))
    }

    async fn router_factory(&self, router: Address) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(router, "factory")?;
        state
            .routers
            .get(&router)
            .copied()
            .ok_or_else(|| LedgerError::read(router, "factory", "no router at address"))
    }

    async fn router_amount_out(
        &self,
        router: Address,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(router, "getAmountOut")?;
        get_amount_out(amount_in, reserve_in, reserve_out, V2_FEE_BPS)
            .map_err(|e| LedgerError::read(router, "getAmountOut", e))
    }

    async fn factory_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(factory, "getPair")?;
        if !state.routers.values().any(|known| *known == factory) {
            return Err(LedgerError::read(factory, "getPair", "no factory at address"));
        }
        Ok(state.find_pair(token_a, token_b).unwrap_or_default())
    }

    async fn chef_lp_token(&self, chef: Address, pool_id: u64) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(chef, "lpToken")?;
        Ok(state.chef(chef, pool_id, "lpToken")?.lp_token)
    }

    async fn chef_reward_token(&self, chef: Address) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(chef, "SUSHI")?;
        match &state.chef {
            Some(known) if known.address == chef => Ok(known.reward_token),
            _ => Err(LedgerError::read(chef, "SUSHI", "no chef at address")),
        }
    }

    async fn chef_pending_reward(
        &self,
        chef: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(chef, "pendingSushi")?;
        let chef = state.chef(chef, pool_id, "pendingSushi")?;
        Ok(chef.pending_reward.get(&owner).copied().unwrap_or_default())
    }

    async fn chef_rewarder(&self, chef: Address, pool_id: u64) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(chef, "rewarder")?;
        Ok(state.chef(chef, pool_id, "rewarder")?.rewarder)
    }

    async fn chef_staked_amount(
        &self,
        chef: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(chef, "userInfo")?;
        let chef = state.chef(chef, pool_id, "userInfo")?;
        Ok(chef.staked.get(&owner).copied().unwrap_or_default())
    }

    async fn rewarder_token(&self, rewarder: Address) -> LedgerResult<Address> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(rewarder, "rewardToken")?;
        match &state.chef {
            Some(chef) if chef.rewarder == rewarder => Ok(chef.rewarder_token),
            _ => Err(LedgerError::read(rewarder, "rewardToken", "no rewarder at address")),
        }
    }

    async fn rewarder_pending(
        &self,
        rewarder: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<U256> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        state.read(rewarder, "pendingToken")?;
        match &state.chef {
            Some(chef) if chef.rewarder == rewarder && chef.pool_id == pool_id => Ok(chef
                .pending_rewarder
                .get(&owner)
                .copied()
                .unwrap_or_default()),
            _ => Err(LedgerError::read(rewarder, "pendingToken", "no rewarder at address")),
        }
    }
}

#[async_trait]
impl LedgerWriter for MockLedger {
    fn account(&self) -> Address {
        self.account
    }

    async fn harvest(&self, chef: Address, pool_id: u64, to: Address) -> LedgerResult<TxReceipt> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        let seq = state.write("harvest")?;

        let Some(known) = state.chef.as_mut() else {
            return Err(reverted("harvest", seq));
        };
        if known.address != chef || known.pool_id != pool_id {
            return Err(reverted("harvest", seq));
        }

        let reward = known.pending_reward.remove(&self.account).unwrap_or_default();
        let extra = known
            .pending_rewarder
            .remove(&self.account)
            .unwrap_or_default();
        let (reward_token, rewarder_token) = (known.reward_token, known.rewarder_token);

        state.credit(reward_token, to, reward);
        state.credit(rewarder_token, to, extra);
        Ok(receipt(seq))
    }

    async fn swap_exact_tokens_for_native(
        &self,
        router: Address,
        params: SwapParams,
    ) -> LedgerResult<TxReceipt> {
        const CALL: &str = "swapExactTokensForETH";
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        let seq = state.write(CALL)?;

        let [input, output] = params.path[..] else {
            return Err(reverted(CALL, seq));
        };
        if !state.routers.contains_key(&router) {
            return Err(reverted(CALL, seq));
        }
        let Some(pair_address) = state.find_pair(input, output) else {
            return Err(reverted(CALL, seq));
        };

        let pair = state.pairs[&pair_address].clone();
        let amount_out = get_amount_out(
            params.amount_in,
            pair.reserve_of(input),
            pair.reserve_of(output),
            V2_FEE_BPS,
        )
        .map_err(|_| reverted(CALL, seq))?;
        if amount_out < params.amount_out_min {
            return Err(reverted(CALL, seq));
        }
        if !state.debit(input, self.account, params.amount_in) {
            return Err(reverted(CALL, seq));
        }

        if let Some(pair) = state.pairs.get_mut(&pair_address) {
            *pair.reserve_of_mut(input) += params.amount_in;
            *pair.reserve_of_mut(output) -= amount_out;
        }
        *state.native.entry(params.to).or_default() += amount_out;
        Ok(receipt(seq))
    }

    async fn add_liquidity_native(
        &self,
        router: Address,
        params: AddLiquidityParams,
    ) -> LedgerResult<TxReceipt> {
        const CALL: &str = "addLiquidityETH";
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        let seq = state.write(CALL)?;

        if !state.routers.contains_key(&router) {
            return Err(reverted(CALL, seq));
        }
        let Some((pair_address, pair)) = state
            .pairs
            .iter()
            .find(|(_, pair)| pair.contains(params.token))
            .map(|(address, pair)| (*address, pair.clone()))
        else {
            return Err(reverted(CALL, seq));
        };
        let native_token = pair.other(params.token);

        let available = state.native.get(&self.account).copied().unwrap_or_default();
        if available < params.value
            || params.amount_token_min > params.amount_token_desired
            || params.amount_native_min > params.value
        {
            return Err(reverted(CALL, seq));
        }

        let reserve_token = pair.reserve_of(params.token);
        let reserve_native = pair.reserve_of(native_token);
        let liquidity = if pair.total_supply.is_zero() {
            params.amount_token_desired.min(params.value)
        } else {
            (params.amount_token_desired * pair.total_supply / reserve_token)
                .min(params.value * pair.total_supply / reserve_native)
        };
        if liquidity.is_zero() || !state.debit(params.token, self.account, params.amount_token_desired)
        {
            return Err(reverted(CALL, seq));
        }

        if let Some(native) = state.native.get_mut(&self.account) {
            *native -= params.value;
        }
        if let Some(pair) = state.pairs.get_mut(&pair_address) {
            *pair.reserve_of_mut(params.token) += params.amount_token_desired;
            *pair.reserve_of_mut(native_token) += params.value;
            pair.total_supply += liquidity;
        }
        state.credit(pair_address, params.to, liquidity);
        Ok(receipt(seq))
    }

    async fn deposit(
        &self,
        chef: Address,
        pool_id: u64,
        amount: U256,
        to: Address,
    ) -> LedgerResult<TxReceipt> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock();
        let seq = state.write("deposit")?;

        let lp_token = match &state.chef {
            Some(known) if known.address == chef && known.pool_id == pool_id => known.lp_token,
            _ => return Err(reverted("deposit", seq)),
        };
        if !state.debit(lp_token, self.account, amount) {
            return Err(reverted("deposit", seq));
        }
        if let Some(known) = state.chef.as_mut() {
            *known.staked.entry(to).or_default() += amount;
        }
        Ok(receipt(seq))
    }
}
