//! Sweep sizing
//!
//! Pure functions of their inputs: the same balance, gas estimate and
//! offer always produce the same plan.

use super::fees::FeeOffer;
use super::types::Asset;
use crate::errors::SweepError;
use alloy::primitives::{Address, U256};

/// Protocol minimum cost of a plain value transfer
pub const FALLBACK_TRANSFER_GAS: u64 = 21_000;

/// A single transfer ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub asset: Asset,
    pub recipient: Address,
    pub amount: U256,
    pub fee_offer: FeeOffer,
    /// Gas the fee reserve was sized for (native transfers only)
    pub gas_limit: Option<u64>,
}

/// Result of sizing a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Transfer(TransferPlan),
    /// Balance is empty, or too small to pay for its own transfer
    NothingToSweep,
}

/// Computes the largest safe transfer for an asset
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepCalculator;

impl SweepCalculator {
    /// Tokens move in full: gas is paid in the native asset
    pub fn plan_token(
        &self,
        token: Address,
        recipient: Address,
        balance: U256,
        fee_offer: FeeOffer,
    ) -> SweepOutcome {
        if balance.is_zero() {
            return SweepOutcome::NothingToSweep;
        }

        SweepOutcome::Transfer(TransferPlan {
            asset: Asset::Token(token),
            recipient,
            amount: balance,
            fee_offer,
            gas_limit: None,
        })
    }

    /// Native currency keeps back `gas * price_per_gas` to pay for the
    /// transfer itself
    pub fn plan_native(
        &self,
        recipient: Address,
        balance: U256,
        gas: u64,
        fee_offer: FeeOffer,
    ) -> SweepOutcome {
        let reserve = Self::reserve(gas, &fee_offer);

        if balance <= reserve {
            return SweepOutcome::NothingToSweep;
        }

        SweepOutcome::Transfer(TransferPlan {
            asset: Asset::Native,
            recipient,
            amount: balance - reserve,
            fee_offer,
            gas_limit: Some(gas),
        })
    }

    /// Maximum fee a transfer of `gas` units can cost under `fee_offer`
    pub fn reserve(gas: u64, fee_offer: &FeeOffer) -> U256 {
        U256::from(gas).saturating_mul(U256::from(fee_offer.price_per_gas()))
    }

    /// Gas estimate, or the plain-transfer minimum when the node could not
    /// simulate the transfer
    pub fn gas_or_fallback(estimate: Result<u64, SweepError>) -> u64 {
        match estimate {
            Ok(gas) => gas,
            Err(e) => {
                tracing::warn!(error = %e, fallback = FALLBACK_TRANSFER_GAS, "Gas estimation failed, using fallback");
                FALLBACK_TRANSFER_GAS
            }
        }
    }
}
