//! Liquidity pair state reader.

use super::TokenResolver;
use crate::ledger::{LedgerReader, LedgerResult};
use ethers::types::Address;
use proteus_domain::entities::PairState;
use std::sync::Arc;
use tracing::debug;

/// Reads total supply and reserves of a pair, annotated with token metadata.
pub struct PairReader<L> {
    ledger: Arc<L>,
    tokens: TokenResolver<L>,
}

impl<L> Clone for PairReader<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<L: LedgerReader> PairReader<L> {
    pub fn new(ledger: Arc<L>, tokens: TokenResolver<L>) -> Self {
        Self { ledger, tokens }
    }

    /// Reads the state of `pair`.
    ///
    /// Supply, both token identities (each chained into metadata resolution)
    /// and reserves are fetched concurrently; token0 receives `reserves[0]`.
    pub async fn read_pair(&self, pair: Address) -> LedgerResult<PairState> {
        let (total_supply, token0, token1, (reserve0, reserve1)) = tokio::try_join!(
            self.ledger.pair_total_supply(pair),
            async {
                let token = self.ledger.pair_token0(pair).await?;
                self.tokens.resolve(token).await
            },
            async {
                let token = self.ledger.pair_token1(pair).await?;
                self.tokens.resolve(token).await
            },
            self.ledger.pair_reserves(pair),
        )?;

        debug!(
            pair = ?pair,
            total_supply = %total_supply,
            reserve0 = %reserve0,
            reserve1 = %reserve1,
            "Read pair state"
        );

        Ok(PairState {
            address: pair,
            total_supply,
            token0: token0.with_amount(reserve0),
            token1: token1.with_amount(reserve1),
        })
    }
}
