//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the signer
//! and the key service. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

/// Environment variable holding the custodial provider's app secret.
pub const CUSTODIAL_SECRET_ENV_VAR: &str = "TIMEBANK_CUSTODIAL_APP_SECRET";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Key service listener settings.
    pub server: ServerConfig,

    /// Chain (fullnode) settings.
    pub chain: ChainConfig,

    /// Deployed Time Dollar contract addresses.
    pub contracts: ContractsConfig,

    /// Custodial wallet provider credentials.
    pub custodial: CustodialConfig,

    /// Block explorer used for transaction links.
    pub explorer: ExplorerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Key service listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Chain configuration.
///
/// The target chain is not one of the networks wallet ecosystems know by
/// name, so `network_name` stays `"custom"` and the chain id is explicit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Network marker handed to wallets.
    pub network_name: String,

    /// Fullnode REST endpoint, including the `/v1` prefix.
    pub rpc_url: String,

    /// Failover fullnode endpoints.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Indexer GraphQL endpoint (read-side queries only).
    pub indexer_url: Option<String>,

    /// Chain id baked into every raw transaction.
    pub chain_id: u8,

    /// Per-call RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas limit for built transactions.
    pub max_gas_amount: u64,

    /// Fixed gas unit price. When unset the fullnode estimate is used.
    pub gas_unit_price: Option<u64>,

    /// Seconds from now until a built transaction expires.
    pub expiration_secs: u64,

    /// Deadline for waiting on settlement.
    pub settlement_timeout_secs: u64,

    /// Base delay between settlement polls in milliseconds.
    pub poll_base_delay_ms: u64,

    /// Maximum delay between settlement polls in milliseconds.
    pub poll_max_delay_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network_name: "custom".to_string(),
            rpc_url: "https://testnet.bardock.movementnetwork.xyz/v1".to_string(),
            failover_urls: Vec::new(),
            indexer_url: None,
            chain_id: 250,
            rpc_timeout_secs: 10,
            max_gas_amount: 200_000,
            gas_unit_price: None,
            expiration_secs: 600,
            settlement_timeout_secs: 60,
            poll_base_delay_ms: 250,
            poll_max_delay_ms: 2_000,
        }
    }
}

/// Deployed contract addresses.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Address the Time Dollar modules are published under.
    pub module_address: String,

    /// Member registry resource address.
    pub registry_address: String,

    /// Treasury resource address.
    pub treasury_address: String,

    /// Coin type accepted by the treasury.
    pub coin_type: String,
}

/// Custodial wallet provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CustodialConfig {
    /// Provider REST base URL.
    pub api_url: String,

    /// Application id.
    pub app_id: String,

    /// Application secret. Prefer `TIMEBANK_CUSTODIAL_APP_SECRET`.
    #[serde(skip_serializing)]
    pub app_secret: Option<String>,

    /// Chain family the provider creates wallets for.
    pub chain_type: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CustodialConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.privy.io".to_string(),
            app_id: String::new(),
            app_secret: None,
            chain_type: "aptos".to_string(),
            timeout_secs: 10,
        }
    }
}

impl CustodialConfig {
    /// Resolve the app secret, environment first.
    pub fn resolved_secret(&self) -> Option<String> {
        std::env::var(CUSTODIAL_SECRET_ENV_VAR)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.app_secret.clone().filter(|s| !s.is_empty()))
    }
}

/// Explorer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Explorer base URL.
    pub base_url: String,

    /// Value for the explorer's `network` query parameter.
    pub network: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://explorer.movementnetwork.xyz".to_string(),
            network: "bardock+testnet".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Link to a transaction page.
    pub fn transaction_url(&self, hash: &str) -> String {
        format!(
            "{}/txn/{}?network={}",
            self.base_url.trim_end_matches('/'),
            hash,
            self.network
        )
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format: "pretty" or "json".
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
