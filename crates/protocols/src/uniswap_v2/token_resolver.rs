//! Token metadata resolution.

use crate::ledger::{LedgerReader, LedgerResult};
use ethers::types::Address;
use proteus_domain::entities::{TokenBalance, TokenInfo};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Resolves ERC-20 metadata, memoizing results for the resolver's lifetime.
///
/// Clones share the same cache.
pub struct TokenResolver<L> {
    ledger: Arc<L>,
    cache: Arc<RwLock<HashMap<Address, TokenInfo>>>,
}

impl<L> Clone for TokenResolver<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<L: LedgerReader> TokenResolver<L> {
    /// Creates a resolver with an empty cache.
    pub fn new(ledger: Arc<L>) -> Self {
        Self {
            ledger,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns symbol and decimals of `token`, reading both concurrently on a cache miss.
    pub async fn resolve(&self, token: Address) -> LedgerResult<TokenInfo> {
        if let Some(info) = self.cache.read().await.get(&token) {
            return Ok(info.clone());
        }

        let (symbol, decimals) = tokio::try_join!(
            self.ledger.token_symbol(token),
            self.ledger.token_decimals(token)
        )?;
        let info = TokenInfo::new(token, symbol, decimals);
        debug!(token = ?token, symbol = %info.symbol, decimals, "Resolved token");

        self.cache.write().await.insert(token, info.clone());
        Ok(info)
    }

    /// Returns `owner`'s balance of `token` along with its metadata.
    pub async fn balance_of(&self, token: Address, owner: Address) -> LedgerResult<TokenBalance> {
        let (info, amount) = tokio::try_join!(
            self.resolve(token),
            self.ledger.token_balance(token, owner)
        )?;
        Ok(info.with_amount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use crate::mock::MockLedger;
    use ethers::types::U256;

    fn gohm() -> Address {
        Address::repeat_byte(0x11)
    }

    fn owner() -> Address {
        Address::repeat_byte(0xee)
    }

    #[tokio::test]
    async fn test_resolve_reads_symbol_and_decimals() {
        let ledger = Arc::new(MockLedger::new(owner()).with_token(gohm(), "gOHM", 18));
        let resolver = TokenResolver::new(ledger.clone());

        let info = resolver.resolve(gohm()).await.unwrap();

        assert_eq!(info, TokenInfo::new(gohm(), "gOHM", 18));
        assert_eq!(ledger.calls_named("symbol"), 1);
        assert_eq!(ledger.calls_named("decimals"), 1);
    }

    #[tokio::test]
    async fn test_resolve_is_memoized() {
        let ledger = Arc::new(MockLedger::new(owner()).with_token(gohm(), "gOHM", 18));
        let resolver = TokenResolver::new(ledger.clone());

        resolver.resolve(gohm()).await.unwrap();
        let before = ledger.call_count();
        resolver.clone().resolve(gohm()).await.unwrap();

        assert_eq!(ledger.call_count(), before);
    }

    #[tokio::test]
    async fn test_balance_of_merges_metadata() {
        let ledger = Arc::new(
            MockLedger::new(owner())
                .with_token(gohm(), "gOHM", 18)
                .with_balance(gohm(), owner(), U256::from(42)),
        );
        let resolver = TokenResolver::new(ledger);

        let balance = resolver.balance_of(gohm(), owner()).await.unwrap();

        assert_eq!(balance.symbol(), "gOHM");
        assert_eq!(balance.amount, U256::from(42));
    }

    #[tokio::test]
    async fn test_read_failure_names_token_and_call() {
        let ledger = Arc::new(MockLedger::new(owner()).with_token(gohm(), "gOHM", 18));
        ledger.fail_on("decimals");
        let resolver = TokenResolver::new(ledger);

        let err = resolver.resolve(gohm()).await.unwrap_err();

        match err {
            LedgerError::Read { target, call, .. } => {
                assert_eq!(target, gohm());
                assert_eq!(call, "decimals");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_token_is_a_read_error() {
        let ledger = Arc::new(MockLedger::new(owner()));
        let resolver = TokenResolver::new(ledger);

        let err = resolver.resolve(gohm()).await.unwrap_err();
        assert!(err.is_read());
    }
}
