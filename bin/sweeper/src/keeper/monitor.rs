//! Phase 2: wait for the claimed tokens and sweep them exactly once.

use super::sweeper::Sweeper;
use crate::chain::LedgerClient;
use crate::errors::Recoverable;
use crate::onchain::SweepReport;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    /// Terminal: one sweep pass completed
    SweptAndDone,
}

impl MonitorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorState::SweptAndDone)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonitorReport {
    pub polls: u32,
    pub sweep_passes: u32,
    pub sweep: Option<SweepReport>,
}

pub struct MonitorSweepLoop<L>
where
    L: LedgerClient,
{
    sweeper: Arc<Sweeper<L>>,
    /// Zero polls back-to-back
    poll_interval: Duration,
    cancel_token: CancellationToken,
}

impl<L> MonitorSweepLoop<L>
where
    L: LedgerClient,
{
    pub fn new(sweeper: Arc<Sweeper<L>>, poll_interval: Duration, cancel_token: CancellationToken) -> Self {
        Self {
            sweeper,
            poll_interval,
            cancel_token,
        }
    }

    /// Run until one sweep pass succeeds or shutdown is requested
    pub async fn run(&self) -> MonitorReport {
        tracing::info!(poll_interval_ms = self.poll_interval.as_millis() as u64, "👀 Starting monitor phase");

        let mut report = MonitorReport::default();
        let mut state = MonitorState::Polling;

        while !state.is_terminal() {
            if self.cancel_token.is_cancelled() {
                tracing::info!(polls = report.polls, "🛑 Monitor phase cancelled");
                return report;
            }
            state = self.step(state, &mut report).await;
        }

        tracing::info!(polls = report.polls, sweep_passes = report.sweep_passes, "✓ Monitor phase complete");
        report
    }

    /// Transition function
    pub async fn step(&self, state: MonitorState, report: &mut MonitorReport) -> MonitorState {
        match state {
            MonitorState::Polling => {
                report.polls += 1;

                let balance = self.sweeper.token_balance().await.or_log("Token balance poll");

                match balance {
                    Some(balance) if !balance.is_zero() => {
                        tracing::info!(poll = report.polls, balance = %balance, "🔔 Token balance detected, sweeping");
                        report.sweep_passes += 1;

                        if let Some(sweep) = self.sweeper.sweep_all().await.or_log("Sweep pass") {
                            tracing::info!(%sweep, "✅ Sweep complete");
                            report.sweep = Some(sweep);
                            return MonitorState::SweptAndDone;
                        }
                    }
                    Some(_) => {
                        tracing::trace!(poll = report.polls, "No token balance yet");
                    }
                    None => {}
                }

                if !self.poll_interval.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(self.poll_interval) => {}
                        _ = self.cancel_token.cancelled() => {}
                    }
                }

                MonitorState::Polling
            }
            MonitorState::SweptAndDone => MonitorState::SweptAndDone,
        }
    }
}
