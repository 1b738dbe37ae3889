//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the submitter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the blob submitter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Confirmation polling settings shared by every backend.
    pub poller: PollerConfig,

    /// EIP-4844 chain settings.
    pub blockchain: BlockchainConfig,

    /// Namespace-tagged backend settings.
    pub namespace: NamespaceConfig,

    /// Dispersal backend settings.
    pub dispersal: DispersalConfig,

    /// App-data backend settings.
    pub app_data: AppDataConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format ("pretty", "compact" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Delay between status queries in milliseconds.
    pub interval_ms: u64,

    /// Total time allowed to reach a terminal status, in seconds.
    pub deadline_secs: u64,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            deadline_secs: 30 * 60,
        }
    }
}

/// EIP-4844 chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Enable the blob-transaction backend.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs (reads only; broadcasts use the primary).
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Expected chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations before a receipt counts as confirmed.
    pub confirmation_blocks: u32,

    /// Fee multiplier applied to network estimates (1.2 = 20% buffer).
    pub fee_multiplier: f64,

    /// Lower bound for the blob fee cap, in wei.
    pub blob_fee_floor_wei: u64,

    /// Execution gas limit of the blob transaction.
    pub gas_limit: u64,

    /// Recipient of the blob transaction.
    pub recipient: String,

    /// Payload capacity of one blob in bytes (payloads are zero-padded to it).
    pub blob_capacity: usize,

    /// Environment variable holding the hex private key.
    pub private_key_env: String,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            fee_multiplier: 1.2,
            blob_fee_floor_wei: 1_000_000_000, // 1 gwei
            gas_limit: 21_000,
            recipient: "0xb10000000000000000000000000000000000000b".to_string(),
            blob_capacity: crate::blob::MAX_BLOB_CAPACITY,
            private_key_env: crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Namespace-tagged backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub enabled: bool,

    /// Hex namespace: up to 10 bytes for a version-0 id, or the full 29 bytes.
    pub namespace: String,

    /// Largest accepted payload in bytes.
    pub max_blob_size: usize,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: "deadbeef".to_string(),
            max_blob_size: 1_900_000,
        }
    }
}

/// Dispersal backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispersalConfig {
    pub enabled: bool,

    /// Custom quorum ids; empty means the service defaults.
    pub quorums: Vec<u8>,

    /// Largest accepted encoded blob in bytes.
    pub max_blob_size: usize,
}

impl Default for DispersalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            quorums: Vec::new(),
            max_blob_size: 16 * 1024 * 1024,
        }
    }
}

/// App-data backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppDataConfig {
    pub enabled: bool,

    /// Application id attached to every submission.
    pub app_id: u32,

    /// Largest accepted payload in bytes.
    pub max_blob_size: usize,
}

impl Default for AppDataConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            app_id: 1,
            max_blob_size: 512 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubmitterConfig::default();
        assert_eq!(config.poller.interval(), Duration::from_secs(5));
        assert_eq!(config.poller.deadline(), Duration::from_secs(1800));
        assert!(!config.blockchain.enabled);
        assert_eq!(config.blockchain.gas_limit, 21_000);
        assert_eq!(config.blockchain.blob_capacity, 126_976);
        assert_eq!(
            config.blockchain.private_key_env,
            crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SubmitterConfig = toml::from_str(
            r#"
            [poller]
            interval_ms = 250

            [blockchain]
            enabled = true
            chain_id = 17000
            "#,
        )
        .unwrap();

        assert_eq!(config.poller.interval_ms, 250);
        assert_eq!(config.poller.deadline_secs, 1800);
        assert!(config.blockchain.enabled);
        assert_eq!(config.blockchain.chain_id, 17000);
        assert_eq!(config.blockchain.rpc_timeout_secs, 10);
        assert_eq!(config.observability.log_level, "info");
    }
}
