//! Fee escalation
//!
//! Every outbound transaction is priced from a fresh fee-market reading
//! inflated by a fixed 20%.

use crate::errors::SweepError;

/// Escalation applied to every observed fee field, in percent
pub const FEE_ESCALATION_PERCENT: u128 = 120;

/// Fee-market data as reported by the node; either family may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub gas_price: Option<u128>,
}

/// Fee-market conditions, exactly one pricing family populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSnapshot {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

impl TryFrom<FeeData> for FeeSnapshot {
    type Error = SweepError;

    fn try_from(data: FeeData) -> Result<Self, Self::Error> {
        match (data.max_fee_per_gas, data.max_priority_fee_per_gas, data.gas_price) {
            (Some(max_fee_per_gas), Some(max_priority_fee_per_gas), _) => Ok(FeeSnapshot::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }),
            (_, _, Some(gas_price)) => Ok(FeeSnapshot::Legacy { gas_price }),
            _ => Err(SweepError::FeeUnavailable),
        }
    }
}

/// Escalated price attached to an outbound transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeOffer {
    /// Type-2 transaction pricing
    Priority {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    /// Legacy gas-price pricing
    Flat { gas_price: u128 },
}

impl FeeOffer {
    /// Worst-case wei paid per unit of gas under this offer
    pub fn price_per_gas(&self) -> u128 {
        match self {
            FeeOffer::Priority { max_fee_per_gas, .. } => *max_fee_per_gas,
            FeeOffer::Flat { gas_price } => *gas_price,
        }
    }

    pub fn is_priority(&self) -> bool {
        matches!(self, FeeOffer::Priority { .. })
    }
}

/// Turns fee-market snapshots into escalated offers
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeEstimator;

impl FeeEstimator {
    /// Escalate raw node data, failing with `FeeUnavailable` when neither
    /// pricing family is present
    pub fn offer(&self, data: FeeData) -> Result<FeeOffer, SweepError> {
        Ok(self.escalate(FeeSnapshot::try_from(data)?))
    }

    /// Escalate every field of the snapshot, preserving its variant
    pub fn escalate(&self, snapshot: FeeSnapshot) -> FeeOffer {
        match snapshot {
            FeeSnapshot::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => FeeOffer::Priority {
                max_fee_per_gas: escalate(max_fee_per_gas),
                max_priority_fee_per_gas: escalate(max_priority_fee_per_gas),
            },
            FeeSnapshot::Legacy { gas_price } => FeeOffer::Flat {
                gas_price: escalate(gas_price),
            },
        }
    }
}

/// floor(value * 120 / 100); saturates instead of wrapping for absurd inputs
fn escalate(value: u128) -> u128 {
    match value.checked_mul(FEE_ESCALATION_PERCENT) {
        Some(scaled) => scaled / 100,
        None => (value / 100).saturating_mul(FEE_ESCALATION_PERCENT),
    }
}
