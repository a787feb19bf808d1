//! Command line interface of the proteus agent.
mod report;
mod wallet;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use ethers::utils::to_checksum;
use proteus_execution::prelude::*;
use proteus_protocols::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wallet::WalletConfig;

#[derive(Parser)]
#[command(name = "proteus")]
#[command(about = "Report and roll a staked SushiSwap liquidity position", long_about = None)]
struct Cli {
    /// Abort the whole invocation after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print native, token, liquidity and pending reward balances
    Balance,
    /// Roll pending rewards back into the pool
    Roll {
        /// Read and quote every stage without submitting transactions
        #[arg(long)]
        dry_run: bool,

        /// Skip the stages an earlier aborted roll already committed
        #[arg(long)]
        resume_from: Option<RollStage>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            debug!(kind = ?err.kind(), "Unrecognized arguments");
            eprintln!("{err}");
            println!("{}", report::USAGE);
            return Ok(());
        }
    };

    match cli.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run(cli.command))
            .await
            .with_context(|| format!("Timed out after {secs}s"))?,
        None => run(cli.command).await,
    }
}

async fn run(command: Commands) -> Result<()> {
    let wallet = WalletConfig::load(&wallet::default_path()?)?;
    let config = wallet.roll_config()?;
    let ledger = Arc::new(EthersLedger::connect(&wallet.arbitrum, &wallet.key).await?);
    drop(wallet);

    let owner = ledger.account();
    println!("{}", to_checksum(&owner, None));

    match command {
        Commands::Balance => {
            let snapshot = SnapshotBuilder::new(ledger, &config)
                .build(owner)
                .await
                .context("Failed to read balances")?;
            println!("{}", report::render_snapshot(&snapshot, &config.native_symbol));
        }
        Commands::Roll {
            dry_run,
            resume_from,
        } => {
            let native_symbol = config.native_symbol.clone();
            let journal = Arc::new(RollJournal::new());
            let mut pipeline = RollPipeline::new(ledger, config).with_observer(journal.clone());
            pipeline.set_dry_run(dry_run);

            match pipeline
                .execute_from(resume_from.unwrap_or(RollStage::Harvest))
                .await
            {
                Ok(report) => {
                    info!(run_id = %report.run_id, events = journal.events().await.len(), "Roll journal closed");
                    println!("{}", report::render_roll(&report, &native_symbol));
                    println!("roll done");
                }
                Err(err) => {
                    let resume_from = err.resume_point();
                    info!(%resume_from, events = journal.events().await.len(), "Roll journal closed");
                    println!("{}", report::render_abort(&err, resume_from, &native_symbol));
                    return Err(err.into());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_from_parses_stage_names() {
        let cli = Cli::try_parse_from(["proteus", "roll", "--resume-from", "add-liquidity"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Roll {
                dry_run: false,
                resume_from: Some(RollStage::AddLiquidity),
            }
        ));
    }

    #[test]
    fn test_unknown_stage_error_names_the_cause() {
        let err = match Cli::try_parse_from(["proteus", "roll", "--resume-from", "bogus"]) {
            Ok(_) => panic!("bogus stage accepted"),
            Err(err) => err,
        };

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("unknown roll stage \"bogus\""));
    }

    #[test]
    fn test_global_timeout_after_subcommand() {
        let cli = Cli::try_parse_from(["proteus", "balance", "--timeout-secs", "30"]).unwrap();

        assert_eq!(cli.timeout_secs, Some(30));
        assert!(matches!(cli.command, Commands::Balance));
    }
}
