use crate::ledger::{LedgerReader, LedgerResult};
use crate::uniswap_v2::{PairReader, TokenResolver};
use ethers::types::{Address, U256};
use proteus_domain::entities::{PairState, TokenBalance};
use std::sync::Arc;

/// Staked position of one account in one chef pool.
#[derive(Debug, Clone)]
pub struct ChefPosition {
    /// State of the staked liquidity pair.
    pub pair: PairState,
    /// Pool tokens deposited by the account.
    pub staked: U256,
    /// Pending rewards: the rewarder's token first, then the chef's own.
    pub pending: Vec<TokenBalance>,
}

/// Reads positions and rewards from a MiniChefV2 contract.
pub struct ChefReader<L> {
    ledger: Arc<L>,
    chef: Address,
    tokens: TokenResolver<L>,
    pairs: PairReader<L>,
}

impl<L: LedgerReader> ChefReader<L> {
    pub fn new(
        ledger: Arc<L>,
        chef: Address,
        tokens: TokenResolver<L>,
        pairs: PairReader<L>,
    ) -> Self {
        Self {
            ledger,
            chef,
            tokens,
            pairs,
        }
    }

    pub fn chef(&self) -> Address {
        self.chef
    }

    /// Reads the staked pair, staked amount and both pending rewards concurrently.
    pub async fn position(&self, pool_id: u64, owner: Address) -> LedgerResult<ChefPosition> {
        let (pair, chef_token, chef_pending, rewarder_pending, staked) = tokio::try_join!(
            async {
                let lp_token = self.ledger.chef_lp_token(self.chef, pool_id).await?;
                self.pairs.read_pair(lp_token).await
            },
            async {
                let token = self.ledger.chef_reward_token(self.chef).await?;
                self.tokens.resolve(token).await
            },
            self.ledger.chef_pending_reward(self.chef, pool_id, owner),
            async {
                let rewarder = self.ledger.chef_rewarder(self.chef, pool_id).await?;
                self.rewarder_pending(rewarder, pool_id, owner).await
            },
            self.ledger.chef_staked_amount(self.chef, pool_id, owner),
        )?;

        Ok(ChefPosition {
            pair,
            staked,
            pending: vec![rewarder_pending, chef_token.with_amount(chef_pending)],
        })
    }

    /// Balance of `token` held by the pool's rewarder contract.
    pub async fn rewarder_holdings(&self, pool_id: u64, token: Address) -> LedgerResult<TokenBalance> {
        let rewarder = self.ledger.chef_rewarder(self.chef, pool_id).await?;
        self.tokens.balance_of(token, rewarder).await
    }

    /// Address of the pool token staked in `pool_id`.
    pub async fn lp_token(&self, pool_id: u64) -> LedgerResult<Address> {
        self.ledger.chef_lp_token(self.chef, pool_id).await
    }

    async fn rewarder_pending(
        &self,
        rewarder: Address,
        pool_id: u64,
        owner: Address,
    ) -> LedgerResult<TokenBalance> {
        let (info, pending) = tokio::try_join!(
            async {
                let token = self.ledger.rewarder_token(rewarder).await?;
                self.tokens.resolve(token).await
            },
            self.ledger.rewarder_pending(rewarder, pool_id, owner),
        )?;
        Ok(info.with_amount(pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockChef, MockLedger, MockPair};

    const CHEF: Address = Address::repeat_byte(0x50);
    const REWARDER: Address = Address::repeat_byte(0x51);
    const SUSHI: Address = Address::repeat_byte(0x10);
    const GOHM: Address = Address::repeat_byte(0x11);
    const WETH: Address = Address::repeat_byte(0x22);
    const PAIR: Address = Address::repeat_byte(0x33);
    const OWNER: Address = Address::repeat_byte(0xee);

    fn reader() -> (Arc<MockLedger>, ChefReader<MockLedger>) {
        let ledger = Arc::new(
            MockLedger::new(OWNER)
                .with_token(SUSHI, "SUSHI", 18)
                .with_token(GOHM, "gOHM", 18)
                .with_token(WETH, "WETH", 18)
                .with_pair(
                    PAIR,
                    MockPair::new(GOHM, WETH, U256::from(1000), U256::from(2000), U256::from(100)),
                )
                .with_balance(GOHM, REWARDER, U256::from(77))
                .with_chef(
                    MockChef::new(CHEF, 12, PAIR, SUSHI, REWARDER, GOHM)
                        .with_staked(OWNER, U256::from(50))
                        .with_pending(OWNER, U256::from(3), U256::from(4)),
                ),
        );
        let tokens = TokenResolver::new(ledger.clone());
        let pairs = PairReader::new(ledger.clone(), tokens.clone());
        let reader = ChefReader::new(ledger.clone(), CHEF, tokens, pairs);
        (ledger, reader)
    }

    #[tokio::test]
    async fn test_position_reads_stake_and_rewards() {
        let (_, reader) = reader();

        let position = reader.position(12, OWNER).await.unwrap();

        assert_eq!(position.staked, U256::from(50));
        assert_eq!(position.pair.address, PAIR);
        assert_eq!(position.pending.len(), 2);
        assert_eq!(position.pending[0].symbol(), "gOHM");
        assert_eq!(position.pending[0].amount, U256::from(4));
        assert_eq!(position.pending[1].symbol(), "SUSHI");
        assert_eq!(position.pending[1].amount, U256::from(3));
    }

    #[tokio::test]
    async fn test_rewarder_holdings() {
        let (_, reader) = reader();

        let holdings = reader.rewarder_holdings(12, GOHM).await.unwrap();

        assert_eq!(holdings.symbol(), "gOHM");
        assert_eq!(holdings.amount, U256::from(77));
    }

    #[tokio::test]
    async fn test_unknown_pool_is_a_read_error() {
        let (_, reader) = reader();

        let err = reader.position(13, OWNER).await.unwrap_err();

        assert!(err.is_read());
        let pool_scoped = ["lpToken", "pendingSushi", "rewarder", "userInfo", "pendingToken"];
        assert!(err.call().is_some_and(|call| pool_scoped.contains(&call)));
    }
}
