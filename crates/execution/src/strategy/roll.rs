//! Reward roll pipeline.

use crate::config::RollConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use proteus_domain::entities::{Quote, TokenBalance};
use proteus_domain::math::ratio::apply_slippage;
use proteus_domain::{Address, U256};
use proteus_protocols::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// One step of the roll, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RollStage {
    /// Claim pending rewards into the owner's balance.
    Harvest,
    /// Sell the full reward token balance for the native currency.
    SellReward,
    /// Sell half of the paired token balance for the native currency.
    SellPairHalf,
    /// Pair the remaining token with native currency in the pool.
    AddLiquidity,
    /// Deposit every pool token held into the reward program.
    Stake,
}

impl RollStage {
    pub const ALL: [RollStage; 5] = [
        RollStage::Harvest,
        RollStage::SellReward,
        RollStage::SellPairHalf,
        RollStage::AddLiquidity,
        RollStage::Stake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RollStage::Harvest => "harvest",
            RollStage::SellReward => "sell-reward",
            RollStage::SellPairHalf => "sell-pair-half",
            RollStage::AddLiquidity => "add-liquidity",
            RollStage::Stake => "stake",
        }
    }
}

impl fmt::Display for RollStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown stage name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown roll stage {0:?}, expected one of harvest, sell-reward, sell-pair-half, add-liquidity, stake")]
pub struct ParseStageError(pub String);

impl FromStr for RollStage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RollStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

/// Amounts a stage worked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDetail {
    Harvest { pool_id: u64 },
    Swap {
        /// Token and amount offered.
        sold: TokenBalance,
        quote: Quote,
        /// Minimum native output accepted by the router.
        min_out: U256,
    },
    Liquidity {
        /// Token and amount paired.
        token: TokenBalance,
        /// Native currency the token amount is worth.
        native_cost: U256,
        native_available: U256,
        token_min: U256,
        native_min: U256,
    },
    Stake { lp_token: Address, amount: U256 },
}

/// Why a stage submitted nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing to sell or pair.
    ZeroBalance,
    /// The native balance does not cover the liquidity add.
    InsufficientBalance { required: U256, available: U256 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ZeroBalance => f.write_str("zero balance"),
            SkipReason::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "insufficient native balance: {available} available, {required} required"
            ),
        }
    }
}

/// How a stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Confirmed(TxReceipt),
    Skipped(SkipReason),
    /// The write was prepared but not submitted.
    DryRun,
}

/// A completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: RollStage,
    pub detail: StageDetail,
    pub outcome: StageOutcome,
}

/// Account and pool a roll acts on, shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollContext {
    pub owner: Address,
    pub pool_id: u64,
}

/// Summary of one roll, complete or partial.
#[derive(Debug, Clone)]
pub struct RollReport {
    pub run_id: Uuid,
    pub owner: Address,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Stages that ran to completion, in order.
    pub stages: Vec<StageRecord>,
}

impl RollReport {
    fn new(owner: Address) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            owner,
            started_at: Utc::now(),
            finished_at: None,
            stages: Vec::new(),
        }
    }

    pub fn stage(&self, stage: RollStage) -> Option<&StageRecord> {
        self.stages.iter().find(|record| record.stage == stage)
    }

    /// Number of stages whose write was confirmed.
    pub fn confirmed(&self) -> usize {
        self.stages
            .iter()
            .filter(|record| matches!(record.outcome, StageOutcome::Confirmed(_)))
            .count()
    }
}

/// Failure of a roll.
///
/// Stages before `stage` stay committed on the ledger; `report` lists them.
#[derive(Debug, Error)]
pub enum RollError {
    #[error("roll aborted at stage {stage}: {source}")]
    Aborted {
        stage: RollStage,
        source: LedgerError,
        report: Box<RollReport>,
    },
}

impl RollError {
    /// Stage to pass to [`RollPipeline::execute_from`] to continue the roll.
    pub fn resume_point(&self) -> RollStage {
        match self {
            RollError::Aborted { stage, .. } => *stage,
        }
    }

    pub fn report(&self) -> &RollReport {
        match self {
            RollError::Aborted { report, .. } => report,
        }
    }
}

/// Receives stage transitions of a roll.
#[async_trait]
pub trait RollObserver: Send + Sync {
    async fn stage_started(&self, _run_id: Uuid, _stage: RollStage) {}

    async fn stage_finished(&self, _run_id: Uuid, _record: &StageRecord) {}

    async fn stage_failed(&self, _run_id: Uuid, _stage: RollStage, _error: &LedgerError) {}
}

/// Harvests, sells, re-pairs and re-stakes the rewards of one pool.
///
/// Stages run strictly in order; each awaits confirmation of its write
/// before the next one reads anything. There is no rollback: a failed stage
/// leaves the earlier ones committed.
pub struct RollPipeline<L> {
    ledger: Arc<L>,
    config: RollConfig,
    tokens: TokenResolver<L>,
    quotes: QuoteEngine<L>,
    chef: ChefReader<L>,
    observer: Option<Arc<dyn RollObserver>>,
    dry_run: bool,
}

impl<L: LedgerWriter> RollPipeline<L> {
    pub fn new(ledger: Arc<L>, config: RollConfig) -> Self {
        let tokens = TokenResolver::new(ledger.clone());
        let pairs = PairReader::new(ledger.clone(), tokens.clone());
        let quotes = QuoteEngine::new(ledger.clone(), config.router, pairs.clone());
        let chef = ChefReader::new(ledger.clone(), config.chef, tokens.clone(), pairs);

        Self {
            ledger,
            config,
            tokens,
            quotes,
            chef,
            observer: None,
            dry_run: false,
        }
    }

    /// Sets the observer notified of stage transitions.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RollObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// In dry run mode every read and quote happens but no write is submitted.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    /// Runs every stage.
    pub async fn execute(&self) -> Result<RollReport, RollError> {
        self.execute_from(RollStage::Harvest).await
    }

    /// Runs the stages from `start` onwards, skipping those an earlier
    /// aborted run already committed.
    pub async fn execute_from(&self, start: RollStage) -> Result<RollReport, RollError> {
        let ctx = RollContext {
            owner: self.ledger.account(),
            pool_id: self.config.pool_id,
        };
        let mut report = RollReport::new(ctx.owner);

        info!(
            run_id = %report.run_id,
            owner = ?ctx.owner,
            pool_id = ctx.pool_id,
            start = %start,
            dry_run = self.dry_run,
            "Starting roll"
        );

        for stage in RollStage::ALL.into_iter().filter(|stage| *stage >= start) {
            if let Some(observer) = &self.observer {
                observer.stage_started(report.run_id, stage).await;
            }

            match self.run_stage(stage, &ctx).await {
                Ok(record) => {
                    if let Some(observer) = &self.observer {
                        observer.stage_finished(report.run_id, &record).await;
                    }
                    report.stages.push(record);
                }
                Err(source) => {
                    warn!(
                        run_id = %report.run_id,
                        stage = %stage,
                        error = %source,
                        "Roll stage failed"
                    );
                    if let Some(observer) = &self.observer {
                        observer.stage_failed(report.run_id, stage, &source).await;
                    }
                    report.finished_at = Some(Utc::now());
                    return Err(RollError::Aborted {
                        stage,
                        source,
                        report: Box::new(report),
                    });
                }
            }
        }

        report.finished_at = Some(Utc::now());
        info!(
            run_id = %report.run_id,
            confirmed = report.confirmed(),
            "Roll done"
        );
        Ok(report)
    }

    async fn run_stage(&self, stage: RollStage, ctx: &RollContext) -> LedgerResult<StageRecord> {
        match stage {
            RollStage::Harvest => self.harvest(ctx).await,
            RollStage::SellReward => self.sell(stage, self.config.reward_token, ctx, false).await,
            RollStage::SellPairHalf => self.sell(stage, self.config.pair_token, ctx, true).await,
            RollStage::AddLiquidity => self.add_liquidity(ctx).await,
            RollStage::Stake => self.stake(ctx).await,
        }
    }

    fn deadline(&self) -> U256 {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        U256::from(now.saturating_add(self.config.deadline_secs))
    }

    async fn harvest(&self, ctx: &RollContext) -> LedgerResult<StageRecord> {
        let pool_id = ctx.pool_id;
        let outcome = if self.dry_run {
            StageOutcome::DryRun
        } else {
            let receipt = self
                .ledger
                .harvest(self.config.chef, pool_id, ctx.owner)
                .await?;
            info!(pool_id, tx_hash = ?receipt.tx_hash, "Harvested rewards");
            StageOutcome::Confirmed(receipt)
        };

        Ok(StageRecord {
            stage: RollStage::Harvest,
            detail: StageDetail::Harvest { pool_id },
            outcome,
        })
    }

    /// Sells the balance of `token` (or half of it) for the native currency.
    async fn sell(
        &self,
        stage: RollStage,
        token: Address,
        ctx: &RollContext,
        half: bool,
    ) -> LedgerResult<StageRecord> {
        let balance = self.tokens.balance_of(token, ctx.owner).await?;
        let amount_in = if half {
            balance.amount / 2
        } else {
            balance.amount
        };
        let sold = TokenBalance::new(balance.info, amount_in);

        if amount_in.is_zero() {
            info!(stage = %stage, token = %sold.symbol(), "Nothing to sell");
            return Ok(StageRecord {
                stage,
                detail: StageDetail::Swap {
                    sold,
                    quote: Quote::zero(),
                    min_out: U256::zero(),
                },
                outcome: StageOutcome::Skipped(SkipReason::ZeroBalance),
            });
        }

        let quote = self
            .quotes
            .quote(token, amount_in, self.config.wrapped_native)
            .await?;
        let min_out = apply_slippage(quote.amount_out, self.config.swap_slippage_thousandths);

        info!(
            stage = %stage,
            token = %sold.symbol(),
            amount_in = %sold.display_amount(),
            amount_out = %quote.amount_out,
            min_out = %min_out,
            "Selling for native"
        );

        let outcome = if self.dry_run {
            StageOutcome::DryRun
        } else {
            let params = SwapParams {
                amount_in,
                amount_out_min: min_out,
                path: vec![token, self.config.wrapped_native],
                to: ctx.owner,
                deadline: self.deadline(),
            };
            let receipt = self
                .ledger
                .swap_exact_tokens_for_native(self.config.router, params)
                .await?;
            StageOutcome::Confirmed(receipt)
        };

        Ok(StageRecord {
            stage,
            detail: StageDetail::Swap {
                sold,
                quote,
                min_out,
            },
            outcome,
        })
    }

    async fn add_liquidity(&self, ctx: &RollContext) -> LedgerResult<StageRecord> {
        let stage = RollStage::AddLiquidity;
        let (native_available, token) = tokio::try_join!(
            self.ledger.native_balance(ctx.owner),
            self.tokens.balance_of(self.config.pair_token, ctx.owner),
        )?;

        if token.is_zero() {
            info!(token = %token.symbol(), "Nothing to pair");
            return Ok(StageRecord {
                stage,
                detail: StageDetail::Liquidity {
                    token,
                    native_cost: U256::zero(),
                    native_available,
                    token_min: U256::zero(),
                    native_min: U256::zero(),
                },
                outcome: StageOutcome::Skipped(SkipReason::ZeroBalance),
            });
        }

        let native_cost = self
            .quotes
            .quote(token.address(), token.amount, self.config.wrapped_native)
            .await?
            .amount_out;
        let tolerance = self.config.liquidity_slippage_thousandths;
        let token_min = apply_slippage(token.amount, tolerance);
        let native_min = apply_slippage(native_cost, tolerance);

        let detail = StageDetail::Liquidity {
            token: token.clone(),
            native_cost,
            native_available,
            token_min,
            native_min,
        };

        if native_available < native_cost {
            warn!(
                required = %native_cost,
                available = %native_available,
                "Native balance too low to add liquidity, skipping"
            );
            return Ok(StageRecord {
                stage,
                detail,
                outcome: StageOutcome::Skipped(SkipReason::InsufficientBalance {
                    required: native_cost,
                    available: native_available,
                }),
            });
        }

        info!(
            token = %token.symbol(),
            amount = %token.display_amount(),
            native_cost = %native_cost,
            token_min = %token_min,
            native_min = %native_min,
            "Adding liquidity"
        );

        let outcome = if self.dry_run {
            StageOutcome::DryRun
        } else {
            let params = AddLiquidityParams {
                token: token.address(),
                amount_token_desired: token.amount,
                amount_token_min: token_min,
                amount_native_min: native_min,
                to: ctx.owner,
                deadline: self.deadline(),
                value: native_cost,
            };
            let receipt = self
                .ledger
                .add_liquidity_native(self.config.router, params)
                .await?;
            StageOutcome::Confirmed(receipt)
        };

        Ok(StageRecord {
            stage,
            detail,
            outcome,
        })
    }

    /// Deposits the whole pool token balance, even when it is zero.
    async fn stake(&self, ctx: &RollContext) -> LedgerResult<StageRecord> {
        let pool_id = ctx.pool_id;
        let lp_token = self.chef.lp_token(pool_id).await?;
        let amount = self.ledger.token_balance(lp_token, ctx.owner).await?;

        info!(pool_id, lp_token = ?lp_token, amount = %amount, "Staking pool tokens");

        let outcome = if self.dry_run {
            StageOutcome::DryRun
        } else {
            let receipt = self
                .ledger
                .deposit(self.chef.chef(), pool_id, amount, ctx.owner)
                .await?;
            StageOutcome::Confirmed(receipt)
        };

        Ok(StageRecord {
            stage: RollStage::Stake,
            detail: StageDetail::Stake { lp_token, amount },
            outcome,
        })
    }
}
