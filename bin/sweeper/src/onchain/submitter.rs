use super::fees::{FeeEstimator, FeeOffer};
use super::requests::{claim_request, transfer_request};
use super::sweep::TransferPlan;
use super::types::SettlementResult;
use crate::chain::LedgerClient;
use crate::errors::SweepError;
use alloy::{
    primitives::{Address, TxHash},
    rpc::types::TransactionRequest,
};
use std::sync::Arc;
use std::time::Duration;

/// EIP-1559 envelope type
const TX_TYPE_EIP1559: u8 = 2;

/// Configuration for the transaction submitter
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// Managed address every transaction is sent from
    pub holder: Address,
    /// Give up waiting for a receipt after this long (None waits forever)
    pub settlement_timeout: Option<Duration>,
}

/// Prices, broadcasts and settles transactions for one holder.
///
/// Submissions are serialized: a second caller waits until the previous
/// transaction is confirmed or abandoned, so nonces never collide.
pub struct TransactionSubmitter<L>
where
    L: LedgerClient,
{
    config: SubmitterConfig,
    ledger: Arc<L>,
    estimator: FeeEstimator,
    submission_lock: tokio::sync::Mutex<()>,
    in_flight: parking_lot::Mutex<Option<TxHash>>,
}

impl<L> TransactionSubmitter<L>
where
    L: LedgerClient,
{
    pub fn new(config: SubmitterConfig, ledger: Arc<L>) -> Self {
        Self {
            config,
            ledger,
            estimator: FeeEstimator,
            submission_lock: tokio::sync::Mutex::new(()),
            in_flight: parking_lot::Mutex::new(None),
        }
    }

    pub fn holder(&self) -> Address {
        self.config.holder
    }

    /// Transaction broadcast but not yet confirmed or abandoned
    pub fn in_flight(&self) -> Option<TxHash> {
        *self.in_flight.lock()
    }

    /// Fresh escalated fee offer from current market conditions
    pub async fn price(&self) -> Result<FeeOffer, SweepError> {
        let data = self.ledger.fee_data().await?;
        let offer = self.estimator.offer(data)?;

        tracing::debug!(?offer, "Priced transaction");

        Ok(offer)
    }

    /// Price and submit IClaimable::claim()
    pub async fn submit_claim(&self, claim_contract: Address) -> Result<SettlementResult, SweepError> {
        let offer = self.price().await?;
        let request = claim_request(self.config.holder, claim_contract);

        self.submit(request, &offer).await
    }

    /// Submit a planned transfer at the price it was sized with
    pub async fn execute(&self, plan: &TransferPlan) -> Result<SettlementResult, SweepError> {
        let request = transfer_request(self.config.holder, plan);

        self.submit(request, &plan.fee_offer).await
    }

    /// Broadcast exactly one transaction and wait for its settlement
    pub async fn submit(
        &self,
        request: TransactionRequest,
        offer: &FeeOffer,
    ) -> Result<SettlementResult, SweepError> {
        let _guard = self.submission_lock.lock().await;

        let request = apply_offer(request.from(self.config.holder), offer);
        let tx_hash = self.ledger.submit(request).await?;
        *self.in_flight.lock() = Some(tx_hash);

        tracing::info!(tx_hash = %tx_hash, priority = offer.is_priority(), price_per_gas = offer.price_per_gas(), "Transaction submitted");

        let settlement = self.await_settlement(tx_hash).await;
        *self.in_flight.lock() = None;
        let settlement = settlement?;

        if !settlement.succeeded {
            tracing::warn!(tx_hash = %tx_hash, block = settlement.block_number, "Transaction reverted");
            return Err(SweepError::SettlementFailed { tx_hash });
        }

        tracing::info!(tx_hash = %tx_hash, block = settlement.block_number, gas_used = settlement.gas_used, "Transaction settled");

        Ok(settlement)
    }

    async fn await_settlement(&self, tx_hash: TxHash) -> Result<SettlementResult, SweepError> {
        let Some(timeout) = self.config.settlement_timeout else {
            return self.ledger.await_settlement(tx_hash).await;
        };

        match tokio::time::timeout(timeout, self.ledger.await_settlement(tx_hash)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(tx_hash = %tx_hash, timeout_secs = timeout.as_secs(), "Settlement wait timed out, abandoning transaction");
                Err(SweepError::SettlementTimeout {
                    tx_hash,
                    timeout_secs: timeout.as_secs(),
                })
            }
        }
    }
}

/// Stamp the offer's pricing fields onto the request
pub fn apply_offer(request: TransactionRequest, offer: &FeeOffer) -> TransactionRequest {
    match *offer {
        FeeOffer::Priority {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => request
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(max_priority_fee_per_gas)
            .transaction_type(TX_TYPE_EIP1559),
        FeeOffer::Flat { gas_price } => request.gas_price(gas_price),
    }
}
