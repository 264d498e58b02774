//! One sweep pass: token first, then native currency.
//!
//! The order matters. The token transfer is paid for in native currency,
//! so the native sweep must see the balance left after that fee.

use crate::chain::LedgerClient;
use crate::errors::SweepError;
use crate::onchain::{
    Asset, SettlementResult, SweepCalculator, SweepOutcome, SweepReport, TransactionSubmitter,
};
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// Moves everything the holder owns to the receiver
pub struct Sweeper<L>
where
    L: LedgerClient,
{
    ledger: Arc<L>,
    submitter: Arc<TransactionSubmitter<L>>,
    calculator: SweepCalculator,
    token: Address,
    receiver: Address,
}

impl<L> Sweeper<L>
where
    L: LedgerClient,
{
    pub fn new(
        ledger: Arc<L>,
        submitter: Arc<TransactionSubmitter<L>>,
        token: Address,
        receiver: Address,
    ) -> Self {
        Self {
            ledger,
            submitter,
            calculator: SweepCalculator,
            token,
            receiver,
        }
    }

    /// Token balance of the managed address
    pub async fn token_balance(&self) -> Result<U256, SweepError> {
        self.ledger
            .balance(self.submitter.holder(), Asset::Token(self.token))
            .await
    }

    /// Native balance of the managed address
    pub async fn native_balance(&self) -> Result<U256, SweepError> {
        self.ledger.balance(self.submitter.holder(), Asset::Native).await
    }

    /// Sweep the token, then native currency.
    ///
    /// Stops at the first failure. A token transfer that already settled
    /// stays settled; the native remainder is left for the next pass.
    pub async fn sweep_all(&self) -> Result<SweepReport, SweepError> {
        let token = self.sweep_token().await?;
        let native = self.sweep_native().await?;

        Ok(SweepReport { token, native })
    }

    async fn sweep_token(&self) -> Result<Option<(U256, SettlementResult)>, SweepError> {
        let balance = self.token_balance().await?;
        if balance.is_zero() {
            tracing::debug!(token = %self.token, "No token balance to sweep");
            return Ok(None);
        }

        let offer = self.submitter.price().await?;

        match self.calculator.plan_token(self.token, self.receiver, balance, offer) {
            SweepOutcome::NothingToSweep => Ok(None),
            SweepOutcome::Transfer(plan) => {
                tracing::info!(token = %self.token, amount = %plan.amount, receiver = %self.receiver, "Sweeping token balance");
                let settlement = self.submitter.execute(&plan).await?;
                Ok(Some((plan.amount, settlement)))
            }
        }
    }

    async fn sweep_native(&self) -> Result<Option<(U256, SettlementResult)>, SweepError> {
        let holder = self.submitter.holder();
        let balance = self.native_balance().await?;
        if balance.is_zero() {
            tracing::debug!("No native balance to sweep");
            return Ok(None);
        }

        let offer = self.submitter.price().await?;
        let gas = SweepCalculator::gas_or_fallback(
            self.ledger
                .estimate_transfer_gas(holder, self.receiver, Asset::Native)
                .await,
        );

        match self.calculator.plan_native(self.receiver, balance, gas, offer) {
            SweepOutcome::NothingToSweep => {
                tracing::info!(
                    balance = %balance,
                    reserve = %SweepCalculator::reserve(gas, &offer),
                    "Native balance does not cover its own transfer fee, leaving it"
                );
                Ok(None)
            }
            SweepOutcome::Transfer(plan) => {
                tracing::info!(amount = %plan.amount, gas, receiver = %self.receiver, "Sweeping native balance");
                let settlement = self.submitter.execute(&plan).await?;
                Ok(Some((plan.amount, settlement)))
            }
        }
    }
}
