//! Human-readable output.

use proteus_domain::U256;
use proteus_domain::entities::PositionSnapshot;
use proteus_domain::value_objects::{Amount, format_units};
use proteus_execution::prelude::*;
use std::fmt::Write;

const NATIVE_DECIMALS: u8 = 18;
const LP_DECIMALS: u8 = 18;

pub const USAGE: &str = "usage:

Check your Proteus balance:
proteus balance

Roll your pending SUSHI/gOHM rewards back into the pool:
proteus roll";

fn native(amount: U256) -> Amount {
    Amount::new(amount, NATIVE_DECIMALS)
}

/// Renders the balance report.
pub fn render_snapshot(snapshot: &PositionSnapshot, native_symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{native_symbol} {}", native(snapshot.native_balance));
    for balance in &snapshot.erc20_balances {
        let _ = writeln!(out, "{balance}");
    }

    let (share0, share1) = &snapshot.liquidity_share;
    let _ = writeln!(out, "\nLIQUIDITY");
    let _ = writeln!(out, "{share0}");
    let _ = writeln!(out, "{share1}");

    let _ = writeln!(out, "\nPENDING");
    for pending in &snapshot.pending_rewards {
        let _ = writeln!(out, "{pending}");
    }

    let _ = writeln!(out, "\nREWARDER");
    let _ = write!(out, "{}", snapshot.rewarder_balance);
    out
}

fn render_stage(record: &StageRecord, native_symbol: &str) -> String {
    let line = match (&record.detail, &record.outcome) {
        (_, StageOutcome::Skipped(SkipReason::InsufficientBalance { .. })) => {
            format!("insufficient {native_symbol} for LP")
        }
        (StageDetail::Harvest { pool_id }, _) => format!("harvest pool {pool_id}"),
        (StageDetail::Swap { sold, .. }, StageOutcome::Skipped(_)) => {
            format!("sell {}->{native_symbol}: nothing to sell", sold.symbol())
        }
        (StageDetail::Swap { sold, quote, .. }, _) => format!(
            "sell {}->{native_symbol}: {} {}",
            sold.symbol(),
            sold.display_amount(),
            native(quote.amount_out)
        ),
        (StageDetail::Liquidity { token, .. }, StageOutcome::Skipped(_)) => {
            format!("add liquidity: no {} to pair", token.symbol())
        }
        (
            StageDetail::Liquidity {
                token, native_cost, ..
            },
            _,
        ) => format!(
            "add liquidity {} {} {native_symbol} {}",
            token.symbol(),
            token.display_amount(),
            native(*native_cost)
        ),
        (StageDetail::Stake { amount, .. }, _) => {
            format!("deposit LP {}", format_units(*amount, LP_DECIMALS))
        }
    };

    match &record.outcome {
        StageOutcome::DryRun => format!("{line} (dry run)"),
        _ => line,
    }
}

/// Renders one line per completed stage.
pub fn render_roll(report: &RollReport, native_symbol: &str) -> String {
    report
        .stages
        .iter()
        .map(|record| render_stage(record, native_symbol))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the partial summary of an aborted roll and how to continue it.
pub fn render_abort(error: &RollError, resume_from: RollStage, native_symbol: &str) -> String {
    let mut out = render_roll(error.report(), native_symbol);
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = write!(
        out,
        "{error}\nearlier stages are committed; continue with: proteus roll --resume-from {resume_from}"
    );
    out
}
