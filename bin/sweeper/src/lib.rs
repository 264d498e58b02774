// bin/sweeper/src/lib.rs

pub mod chain;
pub mod config;
pub mod errors;
pub mod keeper;
pub mod onchain;

// Re-export commonly used items
pub use chain::{AlloyLedgerClient, LedgerClient};
pub use errors::SweepError;
pub use keeper::{Keeper, KeeperOutcome, RunMode};
