//! Concurrent position snapshot.

use crate::config::RollConfig;
use futures::future::try_join_all;
use proteus_domain::entities::PositionSnapshot;
use proteus_domain::math::MathError;
use proteus_domain::Address;
use proteus_protocols::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Failure while building a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("liquidity share: {0}")]
    Math(#[from] MathError),
}

/// Builds [`PositionSnapshot`]s for the configured pool.
pub struct SnapshotBuilder<L> {
    ledger: Arc<L>,
    tracked_tokens: Vec<Address>,
    pair_token: Address,
    pool_id: u64,
    tokens: TokenResolver<L>,
    chef: ChefReader<L>,
}

impl<L: LedgerReader> SnapshotBuilder<L> {
    pub fn new(ledger: Arc<L>, config: &RollConfig) -> Self {
        let tokens = TokenResolver::new(ledger.clone());
        let pairs = PairReader::new(ledger.clone(), tokens.clone());
        let chef = ChefReader::new(ledger.clone(), config.chef, tokens.clone(), pairs);

        Self {
            ledger,
            tracked_tokens: config.tracked_tokens.clone(),
            pair_token: config.pair_token,
            pool_id: config.pool_id,
            tokens,
            chef,
        }
    }

    /// Reads every component of the snapshot concurrently.
    ///
    /// Token balances keep the configured order regardless of which read
    /// completes first.
    pub async fn build(&self, owner: Address) -> Result<PositionSnapshot, SnapshotError> {
        debug!(owner = ?owner, pool_id = self.pool_id, "Building snapshot");

        let (native_balance, erc20_balances, position, rewarder_balance) = tokio::try_join!(
            self.ledger.native_balance(owner),
            try_join_all(
                self.tracked_tokens
                    .iter()
                    .map(|token| self.tokens.balance_of(*token, owner))
            ),
            self.chef.position(self.pool_id, owner),
            self.chef.rewarder_holdings(self.pool_id, self.pair_token),
        )?;

        let liquidity_share = position.pair.liquidity_share(position.staked)?;

        info!(
            owner = ?owner,
            native = %native_balance,
            staked = %position.staked,
            "Snapshot built"
        );

        Ok(PositionSnapshot {
            owner,
            native_balance,
            erc20_balances,
            liquidity_share,
            pending_rewards: position.pending,
            rewarder_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proteus_domain::U256;
    use proteus_protocols::mock::{MockChef, MockLedger, MockPair};

    const OWNER: Address = Address::repeat_byte(0x01);
    const SUSHI: Address = Address::repeat_byte(0x10);
    const GOHM: Address = Address::repeat_byte(0x20);
    const WETH: Address = Address::repeat_byte(0x30);
    const PAIR: Address = Address::repeat_byte(0x40);
    const CHEF: Address = Address::repeat_byte(0x50);
    const REWARDER: Address = Address::repeat_byte(0x60);
    const ROUTER: Address = Address::repeat_byte(0x70);
    const FACTORY: Address = Address::repeat_byte(0x80);

    fn config() -> RollConfig {
        RollConfig {
            router: ROUTER,
            chef: CHEF,
            wrapped_native: WETH,
            reward_token: SUSHI,
            pair_token: GOHM,
            pool_id: 12,
            tracked_tokens: vec![SUSHI, GOHM, WETH],
            liquidity_slippage_thousandths: 5,
            swap_slippage_thousandths: 0,
            deadline_secs: 100,
            native_symbol: "ETH".to_string(),
        }
    }

    fn ledger() -> MockLedger {
        MockLedger::new(OWNER)
            .with_token(SUSHI, "SUSHI", 18)
            .with_token(GOHM, "gOHM", 18)
            .with_token(WETH, "WETH", 18)
            .with_router(ROUTER, FACTORY)
            .with_native(OWNER, U256::from(7))
            .with_balance(SUSHI, OWNER, U256::from(11))
            .with_balance(WETH, OWNER, U256::from(33))
            .with_balance(GOHM, REWARDER, U256::from(999))
            .with_pair(
                PAIR,
                MockPair::new(GOHM, WETH, U256::from(1000), U256::from(2000), U256::from(100)),
            )
            .with_chef(
                MockChef::new(CHEF, 12, PAIR, SUSHI, REWARDER, GOHM)
                    .with_staked(OWNER, U256::from(50))
                    .with_pending(OWNER, U256::from(3), U256::from(4)),
            )
    }

    #[tokio::test]
    async fn test_build_snapshot() {
        let builder = SnapshotBuilder::new(Arc::new(ledger()), &config());
        let snapshot = builder.build(OWNER).await.unwrap();

        assert_eq!(snapshot.owner, OWNER);
        assert_eq!(snapshot.native_balance, U256::from(7));

        let balances: Vec<(&str, U256)> = snapshot
            .erc20_balances
            .iter()
            .map(|b| (b.symbol(), b.amount))
            .collect();
        assert_eq!(
            balances,
            vec![
                ("SUSHI", U256::from(11)),
                ("gOHM", U256::zero()),
                ("WETH", U256::from(33)),
            ]
        );

        let (share0, share1) = &snapshot.liquidity_share;
        assert_eq!((share0.symbol(), share0.amount), ("gOHM", U256::from(500)));
        assert_eq!((share1.symbol(), share1.amount), ("WETH", U256::from(1000)));

        let pending: Vec<(&str, U256)> = snapshot
            .pending_rewards
            .iter()
            .map(|b| (b.symbol(), b.amount))
            .collect();
        assert_eq!(pending, vec![("gOHM", U256::from(4)), ("SUSHI", U256::from(3))]);

        assert_eq!(snapshot.rewarder_balance.symbol(), "gOHM");
        assert_eq!(snapshot.rewarder_balance.amount, U256::from(999));
    }

    #[tokio::test]
    async fn test_rebuild_reuses_resolved_tokens() {
        let ledger = Arc::new(ledger());
        let builder = SnapshotBuilder::new(ledger.clone(), &config());
        builder.build(OWNER).await.unwrap();
        let symbols = ledger.calls_named("symbol");

        builder.build(OWNER).await.unwrap();
        assert_eq!(ledger.calls_named("symbol"), symbols);
    }

    #[tokio::test]
    async fn test_build_propagates_read_failure() {
        let ledger = Arc::new(ledger());
        ledger.fail_on("getReserves");
        let builder = SnapshotBuilder::new(ledger.clone(), &config());

        let err = builder.build(OWNER).await.unwrap_err();
        match err {
            SnapshotError::Ledger(e) => assert_eq!(e.call(), Some("getReserves")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
