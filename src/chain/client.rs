//! Fullnode REST client with failover, timeouts and error mapping.
//!
//! # Responsibilities
//! - Talk to the fullnode's `/v1` REST API
//! - Query chain state (ledger info, sequence numbers, gas price)
//! - Submit BCS-encoded signed transactions and look them up by hash
//! - Fail over across endpoints on network errors, timeouts and 5xx

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::ledger::Ledger;
use crate::chain::transaction::SignedTransaction;
use crate::chain::types::{
    AccountAddress, ChainConfig, ChainError, ChainResult, LedgerInfo, TransactionStatus,
};
use crate::observability::metrics;

const SIGNED_TRANSACTION_BCS: &str = "application/x.aptos.signed_transaction+bcs";

#[derive(Deserialize)]
struct AccountResource {
    sequence_number: String,
}

#[derive(Deserialize)]
struct GasEstimate {
    gas_estimate: u64,
}

#[derive(Deserialize)]
struct PendingTransaction {
    hash: String,
}

#[derive(Deserialize)]
struct TransactionView {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Fullnode client over one primary and any number of failover endpoints.
#[derive(Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    /// Base URLs (primary first), without trailing slash.
    endpoints: Vec<String>,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new client.
    ///
    /// Fails only on an unusable primary URL; invalid failover URLs are
    /// skipped with a warning.
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let mut endpoints = vec![primary.as_str().trim_end_matches('/').to_string()];

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => endpoints.push(url.as_str().trim_end_matches('/').to_string()),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .timeout(timeout_duration)
            .build()
            .map_err(|e| ChainError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            chain_id = config.chain_id,
            "Chain client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            config,
            timeout_duration,
        })
    }

    /// Send a request built per endpoint, moving on after network errors,
    /// timeouts and 5xx answers. The last endpoint's 5xx is returned as-is.
    async fn send<F>(&self, op: &'static str, build: F) -> ChainResult<Response>
    where
        F: Fn(&str) -> reqwest::RequestBuilder,
    {
        let last = self.endpoints.len() - 1;
        for (i, base) in self.endpoints.iter().enumerate() {
            match timeout(self.timeout_duration, build(base).send()).await {
                Ok(Ok(response)) if response.status().is_server_error() && i < last => {
                    tracing::warn!(
                        provider_idx = i,
                        op,
                        status = %response.status(),
                        "Fullnode error, trying next endpoint"
                    );
                }
                Ok(Ok(response)) => {
                    metrics::record_rpc(op, !response.status().is_server_error());
                    return Ok(response);
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next endpoint");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next endpoint");
                }
            }
        }
        metrics::record_rpc(op, false);
        Err(ChainError::Rpc(format!("All fullnode endpoints failed: {}", op)))
    }

    /// Turn a non-success response into `ChainError::Http`.
    async fn error_from(response: Response) -> ChainError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);
        ChainError::Http { status, message }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> ChainResult<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ChainError::Timeout(self.timeout_duration.as_secs())
            } else {
                ChainError::Encoding(e.to_string())
            }
        })
    }

    /// Ledger summary from the root endpoint.
    pub async fn ledger_info(&self) -> ChainResult<LedgerInfo> {
        let response = self.send("ledger_info", |base| self.http.get(base.to_string())).await?;
        self.decode(response).await
    }

    /// Verify the connected chain id matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let actual = self.ledger_info().await?.chain_id;
        if actual != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Sequence number of an existing account.
    pub async fn account_sequence_number(&self, address: AccountAddress) -> ChainResult<u64> {
        let response = self
            .send("account", |base| {
                self.http.get(format!("{}/accounts/{}", base, address))
            })
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChainError::AccountNotFound(address.to_string()));
        }
        let account: AccountResource = self.decode(response).await?;
        account.sequence_number.parse().map_err(|e| {
            ChainError::Encoding(format!(
                "bad sequence number '{}': {}",
                account.sequence_number, e
            ))
        })
    }

    /// Gas unit price estimate.
    pub async fn estimate_gas_price(&self) -> ChainResult<u64> {
        let response = self
            .send("estimate_gas_price", |base| {
                self.http.get(format!("{}/estimate_gas_price", base))
            })
            .await?;
        let estimate: GasEstimate = self.decode(response).await?;
        Ok(estimate.gas_estimate)
    }

    /// Submit a signed transaction as BCS, returning the pending hash.
    pub async fn submit_signed(&self, txn: &SignedTransaction) -> ChainResult<String> {
        let body = txn.to_bcs()?;
        let response = self
            .send("submit", |base| {
                self.http
                    .post(format!("{}/transactions", base))
                    .header(CONTENT_TYPE, SIGNED_TRANSACTION_BCS)
                    .body(body.clone())
            })
            .await?;
        let pending: PendingTransaction = self.decode(response).await?;
        tracing::info!(
            tx_hash = %pending.hash,
            sender = %txn.raw_txn.sender,
            sequence_number = txn.raw_txn.sequence_number,
            "Transaction submitted"
        );
        Ok(pending.hash)
    }

    /// Look up a transaction by hash.
    pub async fn transaction_by_hash(&self, hash: &str) -> ChainResult<TransactionStatus> {
        let response = self
            .send("transaction_by_hash", |base| {
                self.http.get(format!("{}/transactions/by_hash/{}", base, hash))
            })
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(TransactionStatus::NotFound);
        }
        let view: TransactionView = self.decode(response).await?;
        if view.kind == "pending_transaction" {
            return Ok(TransactionStatus::Pending);
        }
        let version = view
            .version
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|e| ChainError::Encoding(format!("bad version: {}", e)))?;
        Ok(TransactionStatus::Committed {
            version,
            success: view.success.unwrap_or(false),
            vm_status: view.vm_status.unwrap_or_default(),
        })
    }

    /// Check if the fullnode is reachable and healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.ledger_info().await.is_ok();
        metrics::record_backend_health("fullnode", healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

#[async_trait]
impl Ledger for ChainClient {
    async fn chain_id(&self) -> ChainResult<u8> {
        Ok(self.ledger_info().await?.chain_id)
    }

    async fn sequence_number(&self, address: AccountAddress) -> ChainResult<u64> {
        self.account_sequence_number(address).await
    }

    async fn gas_unit_price(&self) -> ChainResult<u64> {
        self.estimate_gas_price().await
    }

    async fn submit(&self, txn: &SignedTransaction) -> ChainResult<String> {
        self.submit_signed(txn).await
    }

    async fn transaction_status(&self, hash: &str) -> ChainResult<TransactionStatus> {
        self.transaction_by_hash(hash).await
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
