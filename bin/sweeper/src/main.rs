use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use eyre::Result;
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweeper::config::SweeperConfig;
use sweeper::{AlloyLedgerClient, Keeper, KeeperOutcome, RunMode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration directory
    #[arg(long, default_value = "./configs/dev")]
    config_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Claim already landed: only monitor and sweep
    #[arg(long, conflicts_with = "sweep_once")]
    skip_claim: bool,

    /// Run a single sweep pass and exit
    #[arg(long)]
    sweep_once: bool,
}

impl Cli {
    fn mode(&self) -> RunMode {
        if self.sweep_once {
            RunMode::SweepOnce
        } else if self.skip_claim {
            RunMode::SkipClaim
        } else {
            RunMode::Full
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Claim Sweeper");

    // Load configuration
    let config_path = PathBuf::from(&cli.config_path).join("sweeper.json");
    let config = if config_path.exists() {
        SweeperConfig::load_from_file(&config_path).await?
    } else {
        tracing::warn!(path = %config_path.display(), "sweeper.json not found, using defaults");
        SweeperConfig::default()
    }
    .with_env_overrides();

    let validated = config.validate()?;

    let private_key = std::env::var("PRIVATE_KEY")
        .map_err(|_| eyre::eyre!("PRIVATE_KEY environment variable is required for sweeper"))?;
    let signer: PrivateKeySigner = private_key.parse()?;
    let holder = signer.address();
    let wallet = EthereumWallet::from(signer);

    tracing::info!(
        holder = %holder,
        receiver = %validated.receiver,
        token = %validated.token,
        claim_contract = %validated.claim_contract,
        rpc_url = %validated.rpc_url,
        "Config loaded"
    );

    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(validated.rpc_url.clone());
    let ledger = Arc::new(AlloyLedgerClient::new(provider, validated.receipt_poll_interval()));

    let keeper = Arc::new(Keeper::new(validated.keeper_config(holder), ledger));
    keeper.log_balances().await;

    // Wait for shutdown signal
    {
        let keeper = keeper.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                match keeper.in_flight() {
                    Some(tx_hash) => tracing::info!(%tx_hash, "Shutdown requested, waiting for in-flight transaction"),
                    None => tracing::info!("Shutdown requested"),
                }
                keeper.cancel_token().cancel();
            }
        });
    }

    match keeper.run(cli.mode()).await {
        Ok(KeeperOutcome::Completed { claim, monitor }) => {
            tracing::info!(
                claim_attempts = claim.map(|c| c.attempts),
                polls = monitor.polls,
                "All assets swept"
            );
        }
        Ok(KeeperOutcome::Swept(report)) => {
            tracing::info!(%report, "Sweep finished");
        }
        Ok(KeeperOutcome::Cancelled) => {
            tracing::info!("Stopped before completion");
        }
        Err(e) => {
            tracing::error!(error = %e, "Sweeper failed");
            return Err(e.into());
        }
    }

    tracing::info!("Sweeper stopped");
    Ok(())
}
