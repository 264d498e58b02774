use crate::errors::SweepError;
use crate::keeper::KeeperConfig;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    pub chain: ChainConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// Contract exposing claim()
    pub claim_contract: String,
    /// ERC-20 credited by the claim
    pub token_address: String,
    /// Fixed destination of every sweep
    pub receiver_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub claim_retry_delay_secs: u64,
    /// 0 polls back-to-back
    pub monitor_poll_interval_ms: u64,
    /// None waits for settlement forever
    pub settlement_timeout_secs: Option<u64>,
    pub receipt_poll_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            claim_retry_delay_secs: 5,
            monitor_poll_interval_ms: 0,
            settlement_timeout_secs: Some(300),
            receipt_poll_interval_ms: 1000,
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                rpc_url: "http://localhost:8545".to_string(),
                claim_contract: "0x0000000000000000000000000000000000000000".to_string(),
                token_address: "0x0000000000000000000000000000000000000000".to_string(),
                receiver_address: "0x0000000000000000000000000000000000000000".to_string(),
            },
            timing: TimingConfig::default(),
        }
    }
}

/// Configuration with every address parsed and checked
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub rpc_url: alloy::transports::http::reqwest::Url,
    pub claim_contract: Address,
    pub token: Address,
    pub receiver: Address,
    pub timing: TimingConfig,
}

impl ValidatedConfig {
    /// Engine configuration for the holder the signing key controls
    pub fn keeper_config(&self, holder: Address) -> KeeperConfig {
        KeeperConfig {
            holder,
            claim_contract: self.claim_contract,
            token: self.token,
            receiver: self.receiver,
            claim_retry_delay: Duration::from_secs(self.timing.claim_retry_delay_secs),
            monitor_poll_interval: Duration::from_millis(self.timing.monitor_poll_interval_ms),
            settlement_timeout: self.timing.settlement_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.receipt_poll_interval_ms.max(1))
    }
}

impl SweeperConfig {
    pub async fn load_from_file(path: &Path) -> eyre::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Environment variables take precedence over the file
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("RPC_URL") {
            self.chain.rpc_url = v;
        }
        if let Ok(v) = std::env::var("CLAIM_CONTRACT_ADDRESS") {
            self.chain.claim_contract = v;
        }
        if let Ok(v) = std::env::var("TOKEN_ADDRESS") {
            self.chain.token_address = v;
        }
        if let Ok(v) = std::env::var("RECEIVER_ADDRESS") {
            self.chain.receiver_address = v;
        }
        if let Some(v) = std::env::var("CLAIM_RETRY_DELAY_SECS").ok().and_then(|v| v.parse().ok()) {
            self.timing.claim_retry_delay_secs = v;
        }
        if let Some(v) = std::env::var("SETTLEMENT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()) {
            // 0 disables the timeout
            self.timing.settlement_timeout_secs = if v == 0 { None } else { Some(v) };
        }
        self
    }

    /// Parse and check everything the engine depends on
    pub fn validate(&self) -> Result<ValidatedConfig, SweepError> {
        let rpc_url = self.chain.rpc_url.parse().map_err(|e| {
            SweepError::InvalidConfig(format!("RPC URL {:?}: {}", self.chain.rpc_url, e))
        })?;

        let claim_contract = parse_address("claim_contract", &self.chain.claim_contract)?;
        let token = parse_address("token_address", &self.chain.token_address)?;
        let receiver = parse_address("receiver_address", &self.chain.receiver_address)?;

        if self.timing.claim_retry_delay_secs == 0 {
            return Err(SweepError::InvalidConfig(
                "claim_retry_delay_secs must be positive".to_string(),
            ));
        }

        Ok(ValidatedConfig {
            rpc_url,
            claim_contract,
            token,
            receiver,
            timing: self.timing.clone(),
        })
    }
}

/// Checksummed or single-case hex, `0x` prefix optional; the zero address
/// is a misconfiguration
fn parse_address(field: &str, value: &str) -> Result<Address, SweepError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    let prefixed = format!("0x{}", digits);

    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    let parsed = if mixed_case {
        Address::parse_checksummed(&prefixed, None)
    } else {
        prefixed.parse::<Address>().map_err(Into::into)
    };
    let address =
        parsed.map_err(|e| SweepError::InvalidConfig(format!("{} {:?}: {}", field, value, e)))?;

    if address == Address::ZERO {
        return Err(SweepError::InvalidConfig(format!("{} must not be the zero address", field)));
    }

    Ok(address)
}
