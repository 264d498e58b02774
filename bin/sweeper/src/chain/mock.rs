//! Scripted in-memory ledger for engine tests

use super::LedgerClient;
use crate::errors::SweepError;
use crate::onchain::{Asset, FeeData, SettlementResult};
use alloy::primitives::{Address, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub const HOLDER: Address = Address::new([0x11; 20]);
pub const RECEIVER: Address = Address::new([0x22; 20]);
pub const TOKEN: Address = Address::new([0x33; 20]);
pub const CLAIM_CONTRACT: Address = Address::new([0x44; 20]);

/// How the ledger treats the next claim submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Broadcast refused by the node
    Rejected,
    /// Included with failure status
    Reverted,
    /// Included successfully
    Settled,
}

#[derive(Default)]
struct State {
    fee_data: FeeData,
    native_balance: U256,
    /// Consumed one per read; the last value repeats once drained
    token_balances: VecDeque<U256>,
    failing_token_reads: u32,
    gas_estimate: Option<u64>,
    claim_outcomes: VecDeque<ClaimOutcome>,
    rejected_transfers: u32,
    rejected_native_transfers: u32,
    hang_settlement: bool,
    settlement_delay: Duration,
    /// Broadcast but not yet settled
    unsettled: u32,
    peak_unsettled: u32,
    next_tx: u64,
    outcomes: HashMap<TxHash, bool>,
    submitted: Vec<TransactionRequest>,
    token_reads: u32,
}

pub struct MockLedger {
    state: Mutex<State>,
}

impl MockLedger {
    /// EIP-1559 chain at 10 gwei base, 1 gwei tip, nothing held
    pub fn new() -> Self {
        let state = State {
            fee_data: FeeData {
                max_fee_per_gas: Some(10_000_000_000),
                max_priority_fee_per_gas: Some(1_000_000_000),
                gas_price: Some(9_000_000_000),
            },
            token_balances: VecDeque::from([U256::ZERO]),
            gas_estimate: Some(21_000),
            ..Default::default()
        };

        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_fee_data(self, fee_data: FeeData) -> Self {
        self.state.lock().fee_data = fee_data;
        self
    }

    pub fn with_native_balance(self, balance: u128) -> Self {
        self.state.lock().native_balance = U256::from(balance);
        self
    }

    pub fn with_token_balances(self, balances: &[u64]) -> Self {
        self.state.lock().token_balances = balances.iter().map(|b| U256::from(*b)).collect();
        self
    }

    pub fn with_failing_token_reads(self, count: u32) -> Self {
        self.state.lock().failing_token_reads = count;
        self
    }

    pub fn with_gas_estimate(self, gas: Option<u64>) -> Self {
        self.state.lock().gas_estimate = gas;
        self
    }

    pub fn with_claim_outcomes(self, outcomes: &[ClaimOutcome]) -> Self {
        self.state.lock().claim_outcomes = outcomes.iter().copied().collect();
        self
    }

    pub fn with_rejected_transfers(self, count: u32) -> Self {
        self.state.lock().rejected_transfers = count;
        self
    }

    pub fn with_rejected_native_transfers(self, count: u32) -> Self {
        self.state.lock().rejected_native_transfers = count;
        self
    }

    pub fn with_hanging_settlement(self) -> Self {
        self.state.lock().hang_settlement = true;
        self
    }

    pub fn with_settlement_delay(self, delay: Duration) -> Self {
        self.state.lock().settlement_delay = delay;
        self
    }

    /// Most transactions ever awaiting settlement at the same time
    pub fn peak_unsettled(&self) -> u32 {
        self.state.lock().peak_unsettled
    }

    /// Every request that reached `submit`, rejected ones included
    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.state.lock().submitted.clone()
    }

    pub fn claim_submissions(&self) -> usize {
        self.submitted_to(CLAIM_CONTRACT)
    }

    pub fn token_transfers(&self) -> usize {
        self.submitted_to(TOKEN)
    }

    pub fn native_transfers(&self) -> Vec<U256> {
        self.state
            .lock()
            .submitted
            .iter()
            .filter(|tx| tx.to == Some(TxKind::Call(RECEIVER)))
            .filter_map(|tx| tx.value)
            .collect()
    }

    pub fn token_reads(&self) -> u32 {
        self.state.lock().token_reads
    }

    fn submitted_to(&self, target: Address) -> usize {
        self.state
            .lock()
            .submitted
            .iter()
            .filter(|tx| tx.to == Some(TxKind::Call(target)))
            .count()
    }
}

#[async_trait::async_trait]
impl LedgerClient for MockLedger {
    async fn fee_data(&self) -> Result<FeeData, SweepError> {
        Ok(self.state.lock().fee_data)
    }

    async fn balance(&self, holder: Address, asset: Asset) -> Result<U256, SweepError> {
        assert_eq!(holder, HOLDER, "balance queried for an unmanaged address");
        let mut state = self.state.lock();

        match asset {
            Asset::Native => Ok(state.native_balance),
            Asset::Token(_) => {
                state.token_reads += 1;
                if state.failing_token_reads > 0 {
                    state.failing_token_reads -= 1;
                    return Err(SweepError::RpcError("connection reset".into()));
                }
                let balance = if state.token_balances.len() > 1 {
                    state.token_balances.pop_front().unwrap_or_default()
                } else {
                    state.token_balances.front().copied().unwrap_or_default()
                };
                Ok(balance)
            }
        }
    }

    async fn estimate_transfer_gas(
        &self,
        _from: Address,
        _to: Address,
        _asset: Asset,
    ) -> Result<u64, SweepError> {
        self.state
            .lock()
            .gas_estimate
            .ok_or_else(|| SweepError::RpcError("execution reverted".into()))
    }

    async fn submit(&self, request: TransactionRequest) -> Result<TxHash, SweepError> {
        let mut state = self.state.lock();
        state.submitted.push(request.clone());

        let target = match request.to {
            Some(TxKind::Call(address)) => address,
            _ => return Err(SweepError::SubmissionFailed("contract creation".into())),
        };

        let succeeded = if target == CLAIM_CONTRACT {
            match state.claim_outcomes.pop_front().unwrap_or(ClaimOutcome::Settled) {
                ClaimOutcome::Rejected => {
                    return Err(SweepError::SubmissionFailed("execution reverted: claim not open".into()))
                }
                ClaimOutcome::Reverted => false,
                ClaimOutcome::Settled => true,
            }
        } else {
            if state.rejected_transfers > 0 {
                state.rejected_transfers -= 1;
                return Err(SweepError::SubmissionFailed("nonce too low".into()));
            }
            if target == TOKEN {
                state.token_balances = VecDeque::from([U256::ZERO]);
            } else {
                if state.rejected_native_transfers > 0 {
                    state.rejected_native_transfers -= 1;
                    return Err(SweepError::SubmissionFailed("insufficient funds for gas".into()));
                }
                let spent = request.value.unwrap_or_default();
                state.native_balance = state.native_balance.saturating_sub(spent);
            }
            true
        };

        state.next_tx += 1;
        let tx_hash = TxHash::left_padding_from(&state.next_tx.to_be_bytes());
        state.outcomes.insert(tx_hash, succeeded);
        state.unsettled += 1;
        state.peak_unsettled = state.peak_unsettled.max(state.unsettled);

        Ok(tx_hash)
    }

    async fn await_settlement(&self, tx_hash: TxHash) -> Result<SettlementResult, SweepError> {
        let (hang, delay, succeeded) = {
            let state = self.state.lock();
            (
                state.hang_settlement,
                state.settlement_delay,
                state.outcomes.get(&tx_hash).copied(),
            )
        };

        if hang {
            std::future::pending::<()>().await;
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        {
            let mut state = self.state.lock();
            state.unsettled = state.unsettled.saturating_sub(1);
        }

        let succeeded = succeeded
            .ok_or_else(|| SweepError::RpcError(format!("unknown transaction {}", tx_hash)))?;

        Ok(SettlementResult {
            tx_hash,
            succeeded,
            block_number: 100,
            gas_used: 21_000,
        })
    }
}
