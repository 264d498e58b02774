//! Ledger node connectivity
//!
//! This module provides:
//! - The `LedgerClient` boundary the engine is written against
//! - A JSON-RPC implementation over an alloy provider
//! - A scripted in-memory ledger for tests

mod client;

#[cfg(test)]
pub mod mock;

pub use client::{AlloyLedgerClient, LedgerClient};
