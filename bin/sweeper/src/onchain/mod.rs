mod fees;
mod requests;
mod submitter;
mod sweep;
mod types;

pub use fees::{FeeData, FeeEstimator, FeeOffer, FeeSnapshot, FEE_ESCALATION_PERCENT};
pub use requests::{claim_request, transfer_request};
pub use submitter::{apply_offer, SubmitterConfig, TransactionSubmitter};
pub use sweep::{SweepCalculator, SweepOutcome, TransferPlan, FALLBACK_TRANSFER_GAS};
pub use types::{Asset, SettlementResult, SweepReport};
