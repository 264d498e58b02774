use alloy::primitives::{Address, TxHash, U256};
use std::fmt;

/// Asset held by the managed address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    /// Chain-native currency (pays for gas)
    Native,
    /// ERC-20 token at the given contract address
    Token(Address),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Token(address) => write!(f, "token({})", address),
        }
    }
}

/// Final inclusion status of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementResult {
    pub tx_hash: TxHash,
    /// False for any non-success receipt status
    pub succeeded: bool,
    pub block_number: u64,
    pub gas_used: u64,
}

impl fmt::Display for SettlementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settlement[tx={}, block={}, gas_used={}]",
            self.tx_hash, self.block_number, self.gas_used
        )?;

        if !self.succeeded {
            write!(f, " (REVERTED)")?;
        }

        Ok(())
    }
}

/// Outcome of one sweep pass (token first, then native)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Token amount moved and the settlement that moved it
    pub token: Option<(U256, SettlementResult)>,
    /// Native amount moved and the settlement that moved it
    pub native: Option<(U256, SettlementResult)>,
}

impl SweepReport {
    /// True when neither asset had anything worth moving
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.native.is_none()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sweep[")?;
        match &self.token {
            Some((amount, settlement)) => write!(f, "token={} via {}", amount, settlement.tx_hash)?,
            None => write!(f, "token=none")?,
        }
        match &self.native {
            Some((amount, settlement)) => write!(f, ", native={} via {}", amount, settlement.tx_hash)?,
            None => write!(f, ", native=none")?,
        }
        write!(f, "]")
    }
}
