//! Error types for the claim and sweep engine

use alloy::primitives::TxHash;

/// Errors surfaced by the ledger boundary and the submission engine
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Pricing errors
    #[error("Fee data unavailable: node reported neither EIP-1559 fees nor a gas price")]
    FeeUnavailable,

    // Submission errors
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
    #[error("Transaction {tx_hash} settled with failure status")]
    SettlementFailed { tx_hash: TxHash },
    #[error("Transaction {tx_hash} not settled within {timeout_secs}s")]
    SettlementTimeout { tx_hash: TxHash, timeout_secs: u64 },

    // Read errors
    #[error("RPC error: {0}")]
    RpcError(String),
}

impl SweepError {
    /// Everything except a broken configuration is worth another attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SweepError::InvalidConfig(_))
    }
}

/// Log-and-continue for errors reaching the claim and monitor loops
pub trait Recoverable<T> {
    fn or_log(self, context: &str) -> Option<T>;
}

impl<T> Recoverable<T> for Result<T, SweepError> {
    fn or_log(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "{} failed, continuing", context);
                None
            }
        }
    }
}
