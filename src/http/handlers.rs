//! Key service handlers.
//!
//! # Routes
//! - `GET /health`: liveness plus fullnode reachability
//! - `GET /api/wallets/{wallet_id}/public-key`: normalized public key of a
//!   custodial wallet, looked up with the app's privileged credentials

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::chain::{ChainClient, NetworkInfo};
use crate::config::AppConfig;
use crate::custodial::{CustodialError, ProviderClient};
use crate::wallet::normalize_public_key;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub provider: Option<Arc<ProviderClient>>,
    pub chain: Option<ChainClient>,
    pub network: NetworkInfo,
}

impl AppState {
    /// Build from config. Missing provider credentials leave the key route
    /// answering 503 instead of failing startup.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = match ProviderClient::new(&config.custodial) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Custodial provider disabled");
                None
            }
        };
        let chain = match ChainClient::new(config.chain.clone()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "Chain client disabled");
                None
            }
        };
        Self {
            provider,
            chain,
            network: NetworkInfo::from_config(&config.chain),
        }
    }
}

/// Response body of the public-key route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub wallet_id: String,
    pub address: String,
    pub chain_type: String,
    pub public_key: String,
}

/// API error rendered as `{"error": …}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<CustodialError> for ApiError {
    fn from(err: CustodialError) -> Self {
        let status = match &err {
            CustodialError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            CustodialError::WalletNotFound(_) => StatusCode::NOT_FOUND,
            CustodialError::Http { .. } | CustodialError::Request(_) | CustodialError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            CustodialError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };
        ApiError::new(status, err.to_string())
    }
}

fn valid_wallet_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let fullnode = match &state.chain {
        Some(client) => client.is_healthy().await,
        None => false,
    };
    Json(json!({
        "status": "ok",
        "network": state.network,
        "fullnode": if fullnode { "reachable" } else { "unreachable" },
        "custodial": state.provider.is_some(),
    }))
}

pub async fn wallet_public_key(
    State(state): State<AppState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<PublicKeyResponse>, ApiError> {
    if !valid_wallet_id(&wallet_id) {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "invalid wallet id"));
    }
    let provider = state.provider.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "custodial provider is not configured",
        )
    })?;

    let wallet = provider.get_wallet(&wallet_id).await?;
    let raw_key = wallet
        .public_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            tracing::warn!(wallet_id = %wallet_id, "Provider returned wallet without public key");
            ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("wallet {} has no public key", wallet_id),
            )
        })?;
    let normalized = normalize_public_key(raw_key).map_err(|e| {
        tracing::warn!(wallet_id = %wallet_id, error = %e, "Unusable public key from provider");
        ApiError::new(StatusCode::BAD_GATEWAY, format!("malformed public key: {}", e))
    })?;

    Ok(Json(PublicKeyResponse {
        wallet_id: wallet.id,
        address: wallet.address,
        chain_type: wallet.chain_type,
        public_key: format!("0x{}", normalized),
    }))
}
