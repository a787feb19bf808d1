//! Lifecycle events of a roll.

use crate::strategy::{RollStage, StageOutcome, StageRecord};
use proteus_domain::H256;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollEventKind {
    /// The stage began reading.
    Started,
    /// The stage's write was mined.
    Confirmed { tx_hash: H256 },
    /// The stage submitted nothing.
    Skipped { reason: String },
    /// The stage prepared a write without submitting it.
    DryRun,
    /// The stage failed; it and every later stage were not committed.
    Failed { error: String },
}

impl RollEventKind {
    pub fn from_outcome(outcome: &StageOutcome) -> Self {
        match outcome {
            StageOutcome::Confirmed(receipt) => RollEventKind::Confirmed {
                tx_hash: receipt.tx_hash,
            },
            StageOutcome::Skipped(reason) => RollEventKind::Skipped {
                reason: reason.to_string(),
            },
            StageOutcome::DryRun => RollEventKind::DryRun,
        }
    }

    /// Whether the stage is over, successfully or not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RollEventKind::Started)
    }
}

/// A stage transition of one roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollEvent {
    /// Event ID.
    pub id: String,
    /// Roll the event belongs to.
    pub run_id: Uuid,
    pub stage: RollStage,
    pub kind: RollEventKind,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl RollEvent {
    pub fn new(run_id: Uuid, stage: RollStage, kind: RollEventKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            run_id,
            stage,
            kind,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn finished(run_id: Uuid, record: &StageRecord) -> Self {
        Self::new(run_id, record.stage, RollEventKind::from_outcome(&record.outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SkipReason;
    use proteus_domain::U256;

    #[test]
    fn test_skip_reason_is_rendered() {
        let kind = RollEventKind::from_outcome(&StageOutcome::Skipped(
            SkipReason::InsufficientBalance {
                required: U256::from(10),
                available: U256::from(3),
            },
        ));

        assert_eq!(
            kind,
            RollEventKind::Skipped {
                reason: "insufficient native balance: 3 available, 10 required".to_string()
            }
        );
        assert!(kind.is_terminal());
        assert!(!RollEventKind::Started.is_terminal());
    }

    #[test]
    fn test_event_serializes_stage_name() {
        let event = RollEvent::new(Uuid::nil(), RollStage::SellPairHalf, RollEventKind::DryRun);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["stage"], "sell-pair-half");
        assert_eq!(json["kind"]["type"], "dry_run");
    }
}
