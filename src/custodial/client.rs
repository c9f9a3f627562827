//! Custodial provider REST client.
//!
//! # Responsibilities
//! - Authenticate with the app id and secret (basic auth + app id header)
//! - Fetch wallet records (address, chain family, public key)
//! - Request raw-hash signatures from a wallet
//!
//! The secret never leaves the server; browsers only see what the key
//! service chooses to return.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::CustodialConfig;
use crate::observability::metrics;

const APP_ID_HEADER: &str = "privy-app-id";

/// Errors talking to the custodial provider.
#[derive(Debug, Error)]
pub enum CustodialError {
    /// App id or secret missing.
    #[error("custodial provider is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("wallet {0} not found")]
    WalletNotFound(String),

    /// Provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider request timed out after {0} seconds")]
    Timeout(u64),

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

pub type CustodialResult<T> = Result<T, CustodialError>;

/// Wallet record as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderWallet {
    pub id: String,
    pub address: String,
    pub chain_type: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Deserialize)]
struct RawSignData {
    signature: String,
}

#[derive(Deserialize)]
struct RawSignResponse {
    data: RawSignData,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: String,
}

/// Server-side client for the custodial provider.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    timeout_duration: Duration,
}

impl ProviderClient {
    /// Create a client, resolving the secret from the environment first.
    pub fn new(config: &CustodialConfig) -> CustodialResult<Self> {
        if config.app_id.trim().is_empty() {
            return Err(CustodialError::NotConfigured("custodial.app_id is empty"));
        }
        let app_secret = config
            .resolved_secret()
            .ok_or(CustodialError::NotConfigured("app secret is not set"))?;
        let base_url: url::Url = config
            .api_url
            .parse()
            .map_err(|e| CustodialError::Request(format!("Invalid provider URL: {}", e)))?;

        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout_duration)
            .build()
            .map_err(|e| CustodialError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_secret,
            timeout_duration,
        })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header(APP_ID_HEADER, &self.app_id)
    }

    async fn send(
        &self,
        op: &'static str,
        builder: reqwest::RequestBuilder,
    ) -> CustodialResult<Response> {
        match timeout(self.timeout_duration, self.authorized(builder).send()).await {
            Ok(Ok(response)) => {
                metrics::record_rpc(op, response.status().is_success());
                Ok(response)
            }
            Ok(Err(e)) => {
                metrics::record_rpc(op, false);
                Err(CustodialError::Request(e.to_string()))
            }
            Err(_) => {
                metrics::record_rpc(op, false);
                Err(CustodialError::Timeout(self.timeout_duration.as_secs()))
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> CustodialResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(CustodialError::Http {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CustodialError::Decode(e.to_string()))
    }

    /// Fetch a wallet record by id.
    pub async fn get_wallet(&self, wallet_id: &str) -> CustodialResult<ProviderWallet> {
        let url = format!("{}/v1/wallets/{}", self.base_url, wallet_id);
        let response = self.send("custodial_get_wallet", self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CustodialError::WalletNotFound(wallet_id.to_string()));
        }
        Self::decode(response).await
    }

    /// Sign a 0x-prefixed hash with the wallet, returning the signature hex.
    pub async fn raw_sign(&self, wallet_id: &str, hash: &str) -> CustodialResult<String> {
        let url = format!("{}/v1/wallets/{}/rpc", self.base_url, wallet_id);
        let body = json!({
            "method": "raw_sign",
            "params": { "hash": hash },
        });
        let response = self
            .send("custodial_raw_sign", self.http.post(url).json(&body))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CustodialError::WalletNotFound(wallet_id.to_string()));
        }
        let signed: RawSignResponse = Self::decode(response).await?;
        tracing::debug!(wallet_id = %wallet_id, "Provider signed raw hash");
        Ok(signed.data.signature)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}
