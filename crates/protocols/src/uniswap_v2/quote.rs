//! Swap quotes through the router.

use super::PairReader;
use crate::ledger::{LedgerError, LedgerReader, LedgerResult};
use ethers::types::{Address, U256};
use proteus_domain::entities::Quote;
use std::sync::Arc;
use tracing::debug;

/// Quotes constant-product swaps against the pair registered for two tokens.
///
/// The output amount always comes from the router's own `getAmountOut`, so a
/// quote used as a minimum agrees bit for bit with what the router enforces.
pub struct QuoteEngine<L> {
    ledger: Arc<L>,
    router: Address,
    pairs: PairReader<L>,
}

impl<L: LedgerReader> QuoteEngine<L> {
    pub fn new(ledger: Arc<L>, router: Address, pairs: PairReader<L>) -> Self {
        Self {
            ledger,
            router,
            pairs,
        }
    }

    /// Quotes selling `amount_in` of `input` for `other`.
    ///
    /// A zero input returns a zero quote without touching the ledger.
    pub async fn quote(&self, input: Address, amount_in: U256, other: Address) -> LedgerResult<Quote> {
        if amount_in.is_zero() {
            return Ok(Quote::zero());
        }

        let factory = self.ledger.router_factory(self.router).await?;
        let pair = self.ledger.factory_pair(factory, input, other).await?;
        if pair.is_zero() {
            return Err(LedgerError::PairNotFound {
                token_a: input,
                token_b: other,
            });
        }

        let state = self.pairs.read_pair(pair).await?;
        let (reserve_in, reserve_out) = state.reserves_for(input);
        let amount_out = self
            .ledger
            .router_amount_out(self.router, amount_in, reserve_in, reserve_out)
            .await?;

        debug!(
            input = ?input,
            amount_in = %amount_in,
            reserve_in = %reserve_in,
            reserve_out = %reserve_out,
            amount_out = %amount_out,
            "Quoted swap"
        );

        Ok(Quote::new(amount_in, amount_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLedger, MockPair};
    use crate::uniswap_v2::TokenResolver;
    use proteus_domain::math::constant_product::{V2_FEE_BPS, get_amount_out};

    const ROUTER: Address = Address::repeat_byte(0x40);
    const FACTORY: Address = Address::repeat_byte(0x41);
    const PAIR: Address = Address::repeat_byte(0x33);
    const GOHM: Address = Address::repeat_byte(0x11);
    const WETH: Address = Address::repeat_byte(0x22);

    fn engine(ledger: Arc<MockLedger>) -> QuoteEngine<MockLedger> {
        let pairs = PairReader::new(ledger.clone(), TokenResolver::new(ledger.clone()));
        QuoteEngine::new(ledger, ROUTER, pairs)
    }

    fn ledger() -> Arc<MockLedger> {
        Arc::new(
            MockLedger::new(Address::repeat_byte(0xee))
                .with_token(GOHM, "gOHM", 18)
                .with_token(WETH, "WETH", 18)
                .with_router(ROUTER, FACTORY)
                .with_pair(
                    PAIR,
                    MockPair::new(
                        GOHM,
                        WETH,
                        U256::from(1_000_000),
                        U256::from(4_000_000),
                        U256::from(2_000_000),
                    ),
                ),
        )
    }

    #[tokio::test]
    async fn test_zero_amount_short_circuits() {
        let ledger = ledger();
        let quote = engine(ledger.clone())
            .quote(GOHM, U256::zero(), WETH)
            .await
            .unwrap();

        assert_eq!(quote, Quote::zero());
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quote_selling_token0() {
        let ledger = ledger();
        let quote = engine(ledger.clone())
            .quote(GOHM, U256::from(10_000), WETH)
            .await
            .unwrap();

        let expected = get_amount_out(
            U256::from(10_000),
            U256::from(1_000_000),
            U256::from(4_000_000),
            V2_FEE_BPS,
        )
        .unwrap();
        assert_eq!(quote, Quote::new(U256::from(10_000), expected));
        assert_eq!(ledger.calls_named("getAmountOut"), 1);
    }

    #[tokio::test]
    async fn test_quote_selling_token1_uses_swapped_reserves() {
        let ledger = ledger();
        let quote = engine(ledger)
            .quote(WETH, U256::from(10_000), GOHM)
            .await
            .unwrap();

        let expected = get_amount_out(
            U256::from(10_000),
            U256::from(4_000_000),
            U256::from(1_000_000),
            V2_FEE_BPS,
        )
        .unwrap();
        assert_eq!(quote.amount_out, expected);
    }

    #[tokio::test]
    async fn test_missing_pair() {
        let other = Address::repeat_byte(0x99);
        let err = engine(ledger())
            .quote(GOHM, U256::from(1), other)
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::PairNotFound { .. }));
    }
}
