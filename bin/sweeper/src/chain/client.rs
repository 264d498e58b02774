use crate::errors::SweepError;
use crate::onchain::{Asset, FeeData, SettlementResult};
use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use common::interfaces::erc20::IERC20;
use std::time::Duration;

/// Everything the engine needs from the ledger node
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current fee-market conditions
    async fn fee_data(&self) -> Result<FeeData, SweepError>;

    /// Spendable balance of `holder` in `asset`
    async fn balance(&self, holder: Address, asset: Asset) -> Result<U256, SweepError>;

    /// Gas a transfer of `asset` from `from` to `to` would consume
    async fn estimate_transfer_gas(
        &self,
        from: Address,
        to: Address,
        asset: Asset,
    ) -> Result<u64, SweepError>;

    /// Sign and broadcast, returning the transaction hash
    async fn submit(&self, request: TransactionRequest) -> Result<TxHash, SweepError>;

    /// Block until the transaction is included and report its status
    async fn await_settlement(&self, tx_hash: TxHash) -> Result<SettlementResult, SweepError>;
}

/// JSON-RPC ledger client - generic over provider type
pub struct AlloyLedgerClient<P>
where
    P: Provider + Clone,
{
    provider: P,
    receipt_poll_interval: Duration,
}

impl<P> AlloyLedgerClient<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    /// Create a client over a provider that already carries the signing wallet
    pub fn new(provider: P, receipt_poll_interval: Duration) -> Self {
        Self {
            provider,
            receipt_poll_interval,
        }
    }

    async fn token_balance(&self, token: Address, holder: Address) -> Result<U256, SweepError> {
        let call = IERC20::balanceOfCall { account: holder };
        let tx = TransactionRequest::default()
            .to(token)
            .input(call.abi_encode().into());

        let result = self
            .provider
            .call(tx)
            .await
            .map_err(|e| SweepError::RpcError(format!("balanceOf failed: {}", e)))?;

        IERC20::balanceOfCall::abi_decode_returns(&result)
            .map_err(|e| SweepError::RpcError(format!("balanceOf decode failed: {}", e)))
    }

    /// Stamp the sender's pending nonce as the node reports it.
    ///
    /// A refused broadcast never advances it. A nonce already on the request
    /// is kept.
    async fn with_pending_nonce(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionRequest, SweepError> {
        if request.nonce.is_some() {
            return Ok(request);
        }

        let from = request
            .from
            .ok_or_else(|| SweepError::SubmissionFailed("request has no sender".to_string()))?;

        let nonce = self
            .provider
            .get_transaction_count(from)
            .pending()
            .await
            .map_err(|e| SweepError::RpcError(format!("getTransactionCount failed: {}", e)))?;

        Ok(request.nonce(nonce))
    }
}

#[async_trait::async_trait]
impl<P> LedgerClient for AlloyLedgerClient<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn fee_data(&self) -> Result<FeeData, SweepError> {
        let mut data = FeeData::default();

        // Legacy chains reject the fee-history call; that is not an error here
        match self.provider.estimate_eip1559_fees().await {
            Ok(estimate) => {
                data.max_fee_per_gas = Some(estimate.max_fee_per_gas);
                data.max_priority_fee_per_gas = Some(estimate.max_priority_fee_per_gas);
            }
            Err(e) => {
                tracing::debug!(error = %e, "EIP-1559 fee estimate unavailable");
            }
        }

        match self.provider.get_gas_price().await {
            Ok(gas_price) => data.gas_price = Some(gas_price),
            Err(e) => {
                tracing::debug!(error = %e, "Gas price unavailable");
            }
        }

        Ok(data)
    }

    async fn balance(&self, holder: Address, asset: Asset) -> Result<U256, SweepError> {
        match asset {
            Asset::Native => self
                .provider
                .get_balance(holder)
                .await
                .map_err(|e| SweepError::RpcError(format!("getBalance failed: {}", e))),
            Asset::Token(token) => self.token_balance(token, holder).await,
        }
    }

    async fn estimate_transfer_gas(
        &self,
        from: Address,
        to: Address,
        asset: Asset,
    ) -> Result<u64, SweepError> {
        let tx = match asset {
            Asset::Native => TransactionRequest::default()
                .from(from)
                .to(to)
                .value(U256::ZERO),
            Asset::Token(token) => {
                let call = IERC20::transferCall { to, value: U256::ZERO };
                TransactionRequest::default()
                    .from(from)
                    .to(token)
                    .input(call.abi_encode().into())
            }
        };

        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| SweepError::RpcError(format!("estimateGas failed: {}", e)))
    }

    async fn submit(&self, request: TransactionRequest) -> Result<TxHash, SweepError> {
        let request = self.with_pending_nonce(request).await?;
        let nonce = request.nonce;

        let pending_tx = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| SweepError::SubmissionFailed(e.to_string()))?;

        let tx_hash = *pending_tx.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, ?nonce, "Transaction sent");

        Ok(tx_hash)
    }

    async fn await_settlement(&self, tx_hash: TxHash) -> Result<SettlementResult, SweepError> {
        let mut poll = tokio::time::interval(self.receipt_poll_interval);

        loop {
            poll.tick().await;

            let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => receipt,
                Ok(None) => {
                    tracing::trace!(tx_hash = %tx_hash, "Receipt not yet available");
                    continue;
                }
                Err(e) => {
                    // Watched until a receipt arrives or the caller's timeout fires
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed, polling again");
                    continue;
                }
            };

            return Ok(SettlementResult {
                tx_hash,
                succeeded: receipt.status(),
                block_number: receipt.block_number.unwrap_or(0),
                gas_used: receipt.gas_used,
            });
        }
    }
}
