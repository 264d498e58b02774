mod claim_loop;
mod monitor;
mod sweeper;

pub use claim_loop::{ClaimReport, ClaimRetryLoop, ClaimState, DEFAULT_CLAIM_RETRY_DELAY};
pub use monitor::{MonitorReport, MonitorState, MonitorSweepLoop};
pub use sweeper::Sweeper;

use crate::chain::LedgerClient;
use crate::errors::SweepError;
use crate::onchain::{SubmitterConfig, SweepReport, TransactionSubmitter};
use alloy::primitives::{Address, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Where the keeper starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Claim, then monitor and sweep
    Full,
    /// Claim already landed; go straight to monitoring
    SkipClaim,
    /// One sweep pass, then exit
    SweepOnce,
}

/// Keeper configuration
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    pub holder: Address,
    pub claim_contract: Address,
    pub token: Address,
    pub receiver: Address,
    pub claim_retry_delay: Duration,
    pub monitor_poll_interval: Duration,
    pub settlement_timeout: Option<Duration>,
}

/// How a keeper run ended
#[derive(Debug, Clone)]
pub enum KeeperOutcome {
    /// Both phases reached their terminal states
    Completed {
        claim: Option<ClaimReport>,
        monitor: MonitorReport,
    },
    /// Single pass finished
    Swept(SweepReport),
    /// Shutdown requested before a terminal state
    Cancelled,
}

/// Main keeper orchestrator: claim phase, then monitor phase
pub struct Keeper<L>
where
    L: LedgerClient,
{
    config: KeeperConfig,
    submitter: Arc<TransactionSubmitter<L>>,
    sweeper: Arc<Sweeper<L>>,
    cancel_token: CancellationToken,
}

impl<L> Keeper<L>
where
    L: LedgerClient,
{
    pub fn new(config: KeeperConfig, ledger: Arc<L>) -> Self {
        let submitter = Arc::new(TransactionSubmitter::new(
            SubmitterConfig {
                holder: config.holder,
                settlement_timeout: config.settlement_timeout,
            },
            ledger.clone(),
        ));
        let sweeper = Arc::new(Sweeper::new(ledger, submitter.clone(), config.token, config.receiver));

        Self {
            config,
            submitter,
            sweeper,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get cancellation token for graceful shutdown
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Transaction currently awaiting settlement, if any
    pub fn in_flight(&self) -> Option<TxHash> {
        self.submitter.in_flight()
    }

    /// Log the holder's current balances; read failures are only logged
    pub async fn log_balances(&self) {
        match self.sweeper.native_balance().await {
            Ok(balance) => tracing::info!(holder = %self.config.holder, balance = %balance, "Native balance"),
            Err(e) => tracing::warn!(error = %e, "Native balance unavailable"),
        }
        match self.sweeper.token_balance().await {
            Ok(balance) => tracing::info!(holder = %self.config.holder, token = %self.config.token, balance = %balance, "Token balance"),
            Err(e) => tracing::warn!(error = %e, "Token balance unavailable"),
        }
    }

    pub async fn run(&self, mode: RunMode) -> Result<KeeperOutcome, SweepError> {
        tracing::info!(?mode, holder = %self.config.holder, receiver = %self.config.receiver, "Keeper starting");

        if mode == RunMode::SweepOnce {
            let sweep = self.sweeper.sweep_all().await?;
            tracing::info!(%sweep, "Single sweep pass finished");
            return Ok(KeeperOutcome::Swept(sweep));
        }

        let claim = if mode == RunMode::Full {
            let claim_loop = ClaimRetryLoop::new(
                self.submitter.clone(),
                self.sweeper.clone(),
                self.config.claim_contract,
                self.config.claim_retry_delay,
                self.cancel_token.clone(),
            );
            let report = claim_loop.run().await;
            if !report.succeeded() {
                return Ok(KeeperOutcome::Cancelled);
            }
            Some(report)
        } else {
            tracing::info!("Skipping claim phase");
            None
        };

        let monitor_loop = MonitorSweepLoop::new(
            self.sweeper.clone(),
            self.config.monitor_poll_interval,
            self.cancel_token.clone(),
        );
        let monitor = monitor_loop.run().await;
        if monitor.sweep.is_none() {
            return Ok(KeeperOutcome::Cancelled);
        }

        Ok(KeeperOutcome::Completed { claim, monitor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{ClaimOutcome, MockLedger, CLAIM_CONTRACT, HOLDER, RECEIVER, TOKEN};

    fn make_config() -> KeeperConfig {
        KeeperConfig {
            holder: HOLDER,
            claim_contract: CLAIM_CONTRACT,
            token: TOKEN,
            receiver: RECEIVER,
            claim_retry_delay: DEFAULT_CLAIM_RETRY_DELAY,
            monitor_poll_interval: Duration::ZERO,
            settlement_timeout: Some(Duration::from_secs(60)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_claims_then_sweeps() {
        let ledger = Arc::new(
            MockLedger::new()
                .with_claim_outcomes(&[ClaimOutcome::Reverted])
                .with_token_balances(&[0, 0, 1_000])
                .with_native_balance(10_000_000_000_000_000),
        );
        let keeper = Keeper::new(make_config(), ledger.clone());

        let outcome = keeper.run(RunMode::Full).await.unwrap();

        let KeeperOutcome::Completed { claim, monitor } = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(claim.map(|c| c.attempts), Some(2));
        assert_eq!(monitor.sweep_passes, 1);
        assert_eq!(ledger.claim_submissions(), 2);
        assert_eq!(ledger.token_transfers(), 1);
        assert_eq!(ledger.native_transfers().len(), 1);
        assert_eq!(keeper.in_flight(), None);
    }

    #[tokio::test]
    async fn test_skip_claim_never_claims() {
        let ledger = Arc::new(MockLedger::new().with_token_balances(&[5]));
        let keeper = Keeper::new(make_config(), ledger.clone());

        let outcome = keeper.run(RunMode::SkipClaim).await.unwrap();

        assert!(matches!(outcome, KeeperOutcome::Completed { claim: None, .. }));
        assert_eq!(ledger.claim_submissions(), 0);
    }

    #[tokio::test]
    async fn test_sweep_once_propagates_failure() {
        let ledger = Arc::new(MockLedger::new().with_token_balances(&[5]).with_rejected_transfers(1));
        let keeper = Keeper::new(make_config(), ledger.clone());

        let result = keeper.run(RunMode::SweepOnce).await;

        assert!(matches!(result, Err(SweepError::SubmissionFailed(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let ledger = Arc::new(MockLedger::new());
        let keeper = Keeper::new(make_config(), ledger.clone());
        keeper.cancel_token().cancel();

        let outcome = keeper.run(RunMode::Full).await.unwrap();

        assert!(matches!(outcome, KeeperOutcome::Cancelled));
        assert!(ledger.submitted().is_empty());
    }
}
