//! Phase 1: retry the claim until it settles.
//!
//! Between attempts the loop sweeps any tokens that already reached the
//! holder. Failures there are logged and never end the phase.

use super::sweeper::Sweeper;
use crate::chain::LedgerClient;
use crate::errors::Recoverable;
use crate::onchain::{SettlementResult, TransactionSubmitter};
use alloy::primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay between claim attempts
pub const DEFAULT_CLAIM_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    Attempting,
    Waiting,
    /// Terminal: hand over to the monitor phase
    ClaimSucceeded,
}

impl ClaimState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimState::ClaimSucceeded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimReport {
    pub attempts: u32,
    pub waits: u32,
    pub opportunistic_sweeps: u32,
    pub settlement: Option<SettlementResult>,
}

impl ClaimReport {
    pub fn succeeded(&self) -> bool {
        self.settlement.is_some()
    }
}

pub struct ClaimRetryLoop<L>
where
    L: LedgerClient,
{
    submitter: Arc<TransactionSubmitter<L>>,
    sweeper: Arc<Sweeper<L>>,
    claim_contract: Address,
    retry_delay: Duration,
    cancel_token: CancellationToken,
}

impl<L> ClaimRetryLoop<L>
where
    L: LedgerClient,
{
    pub fn new(
        submitter: Arc<TransactionSubmitter<L>>,
        sweeper: Arc<Sweeper<L>>,
        claim_contract: Address,
        retry_delay: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            submitter,
            sweeper,
            claim_contract,
            retry_delay,
            cancel_token,
        }
    }

    /// Run until the claim settles or shutdown is requested
    pub async fn run(&self) -> ClaimReport {
        tracing::info!(contract = %self.claim_contract, retry_delay_secs = self.retry_delay.as_secs(), "🚀 Starting claim phase");

        let mut report = ClaimReport::default();
        let mut state = ClaimState::Attempting;

        while !state.is_terminal() {
            if self.cancel_token.is_cancelled() {
                tracing::info!(attempts = report.attempts, "🛑 Claim phase cancelled");
                return report;
            }
            state = self.step(state, &mut report).await;
        }

        tracing::info!(attempts = report.attempts, waits = report.waits, "✓ Claim phase complete");
        report
    }

    /// Transition function
    pub async fn step(&self, state: ClaimState, report: &mut ClaimReport) -> ClaimState {
        match state {
            ClaimState::Attempting => {
                report.attempts += 1;

                match self.submitter.submit_claim(self.claim_contract).await {
                    Ok(settlement) => {
                        tracing::info!(attempt = report.attempts, tx_hash = %settlement.tx_hash, block = settlement.block_number, "✅ Claim settled");
                        report.settlement = Some(settlement);
                        ClaimState::ClaimSucceeded
                    }
                    Err(e) => {
                        tracing::warn!(attempt = report.attempts, error = %e, "Claim attempt failed, retrying in {}s", self.retry_delay.as_secs());
                        ClaimState::Waiting
                    }
                }
            }
            ClaimState::Waiting => {
                self.opportunistic_sweep(report).await;

                report.waits += 1;
                tokio::select! {
                    _ = tokio::time::sleep(self.retry_delay) => {}
                    _ = self.cancel_token.cancelled() => {}
                }

                ClaimState::Attempting
            }
            ClaimState::ClaimSucceeded => ClaimState::ClaimSucceeded,
        }
    }

    async fn opportunistic_sweep(&self, report: &mut ClaimReport) {
        let Some(balance) = self.sweeper.token_balance().await.or_log("Token balance check") else {
            return;
        };

        if balance.is_zero() {
            return;
        }

        tracing::info!(balance = %balance, "🔔 Tokens arrived before the claim settled, sweeping");

        if let Some(sweep) = self.sweeper.sweep_all().await.or_log("Opportunistic sweep") {
            report.opportunistic_sweeps += 1;
            tracing::info!(%sweep, "Opportunistic sweep complete");
        }
    }
}
