//! In-memory journal of roll events.

use super::{RollEvent, RollEventKind};
use crate::strategy::{RollObserver, RollStage, StageRecord};
use async_trait::async_trait;
use proteus_protocols::prelude::LedgerError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Records the stage transitions of every roll it observes.
#[derive(Default)]
pub struct RollJournal {
    events: Arc<RwLock<Vec<RollEvent>>>,
}

impl RollJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn add_event(&self, event: RollEvent) {
        debug!(
            run_id = %event.run_id,
            stage = %event.stage,
            kind = ?event.kind,
            "Recorded roll event"
        );
        self.events.write().await.push(event);
    }

    /// All recorded events, oldest first.
    pub async fn events(&self) -> Vec<RollEvent> {
        self.events.read().await.clone()
    }

    /// Events of one roll, oldest first.
    pub async fn run_events(&self, run_id: Uuid) -> Vec<RollEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|event| event.run_id == run_id)
            .cloned()
            .collect()
    }

    /// Stage that failed in the most recent roll, if it failed.
    ///
    /// Passing it to `execute_from` continues the roll without repeating
    /// committed stages.
    pub async fn resume_point(&self) -> Option<RollStage> {
        let events = self.events.read().await;
        let last_run = events.last()?.run_id;
        events
            .iter()
            .rev()
            .take_while(|event| event.run_id == last_run)
            .find(|event| matches!(event.kind, RollEventKind::Failed { .. }))
            .map(|event| event.stage)
    }

    /// Stages of the most recent roll that reached a successful end.
    pub async fn completed_stages(&self) -> Vec<RollStage> {
        let events = self.events.read().await;
        let Some(last_run) = events.last().map(|event| event.run_id) else {
            return Vec::new();
        };
        events
            .iter()
            .filter(|event| event.run_id == last_run)
            .filter(|event| {
                event.kind.is_terminal() && !matches!(event.kind, RollEventKind::Failed { .. })
            })
            .map(|event| event.stage)
            .collect()
    }
}

#[async_trait]
impl RollObserver for RollJournal {
    async fn stage_started(&self, run_id: Uuid, stage: RollStage) {
        self.add_event(RollEvent::new(run_id, stage, RollEventKind::Started))
            .await;
    }

    async fn stage_finished(&self, run_id: Uuid, record: &StageRecord) {
        let event = RollEvent::finished(run_id, record);
        info!(run_id = %run_id, stage = %record.stage, kind = ?event.kind, "Stage finished");
        self.add_event(event).await;
    }

    async fn stage_failed(&self, run_id: Uuid, stage: RollStage, error: &LedgerError) {
        warn!(run_id = %run_id, stage = %stage, error = %error, "Stage failed");
        self.add_event(RollEvent::new(
            run_id,
            stage,
            RollEventKind::Failed {
                error: error.to_string(),
            },
        ))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RollConfig;
    use crate::strategy::RollPipeline;
    use proteus_domain::{Address, U256};
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

    fn setup() -> (Arc<MockLedger>, RollConfig) {
        let ledger = MockLedger::new(OWNER)
            .with_token(SUSHI, "SUSHI", 18)
            .with_token(GOHM, "gOHM", 18)
            .with_token(WETH, "WETH", 18)
            .with_router(ROUTER, FACTORY)
            .with_native(OWNER, U256::from(10_000))
            .with_pair(
                PAIR,
                MockPair::new(
                    GOHM,
                    WETH,
                    U256::from(1_000_000),
                    U256::from(2_000_000),
                    U256::from(1_000_000),
                ),
            )
            .with_chef(
                MockChef::new(CHEF, 12, PAIR, SUSHI, REWARDER, GOHM).with_pending(
                    OWNER,
                    U256::zero(),
                    U256::from(400),
                ),
            );
        let config = RollConfig {
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
        };
        (Arc::new(ledger), config)
    }

    #[tokio::test]
    async fn test_journal_records_every_transition() {
        let (ledger, config) = setup();
        let journal = Arc::new(RollJournal::new());
        let report = RollPipeline::new(ledger, config)
            .with_observer(journal.clone())
            .execute()
            .await
            .unwrap();

        let events = journal.run_events(report.run_id).await;
        assert_eq!(events.len(), 10);
        assert_eq!(events[0].kind, RollEventKind::Started);
        assert!(matches!(events[1].kind, RollEventKind::Confirmed { .. }));
        assert_eq!(
            events[3].kind,
            RollEventKind::Skipped {
                reason: "zero balance".to_string()
            }
        );
        assert_eq!(journal.completed_stages().await, RollStage::ALL.to_vec());
        assert_eq!(journal.resume_point().await, None);
    }

    #[tokio::test]
    async fn test_resume_point_after_failure() {
        let (ledger, config) = setup();
        ledger.fail_on("swapExactTokensForETH");
        let journal = Arc::new(RollJournal::new());

        let err = RollPipeline::new(ledger, config)
            .with_observer(journal.clone())
            .execute()
            .await
            .unwrap_err();

        assert_eq!(journal.resume_point().await, Some(RollStage::SellPairHalf));
        assert_eq!(journal.resume_point().await, Some(err.resume_point()));
        assert_eq!(
            journal.completed_stages().await,
            vec![RollStage::Harvest, RollStage::SellReward]
        );
    }

    #[tokio::test]
    async fn test_empty_journal_has_no_resume_point() {
        let journal = RollJournal::new();
        assert_eq!(journal.resume_point().await, None);
        assert!(journal.completed_stages().await.is_empty());
    }
}
