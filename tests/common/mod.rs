//! Shared mock servers for integration tests.
//!
//! - a fullnode speaking the `/v1` REST subset the chain client uses, which
//!   checks every submitted signature before accepting it
//! - a custodial provider that raw-signs with a local Ed25519 key

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde_json::{json, Value};
use sha3::{Digest, Sha3_256};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use timebank_signer::config::{ChainConfig, CustodialConfig};

pub const CHAIN_ID: u8 = 250;
pub const APP_ID: &str = "test-app";
pub const APP_SECRET: &str = "test-secret";
pub const WALLET_ID: &str = "wallet-ready";
pub const KEYLESS_WALLET_ID: &str = "wallet-keyless";
pub const WALLET_ADDRESS: &str =
    "0x00000000000000000000000000000000000000000000000000000000000e0b01";
pub const UNKNOWN_ACCOUNT: &str =
    "0x000000000000000000000000000000000000000000000000000000000000dead";

/// Length of a BCS Ed25519 authenticator: variant + len + key + len + sig.
const AUTHENTICATOR_LEN: usize = 1 + 1 + 32 + 1 + 64;

fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// Serve `router` on a random local port.
pub async fn serve_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let actual_addr = listener.local_addr().unwrap();
    let base_url = format!("http://{actual_addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    sleep(Duration::from_millis(50)).await;
    (base_url, handle)
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1")
}

pub fn chain_config(rpc_url: &str) -> ChainConfig {
    ChainConfig {
        rpc_url: rpc_url.to_string(),
        chain_id: CHAIN_ID,
        rpc_timeout_secs: 2,
        settlement_timeout_secs: 5,
        poll_base_delay_ms: 5,
        poll_max_delay_ms: 20,
        ..ChainConfig::default()
    }
}

pub fn custodial_config(api_url: &str) -> CustodialConfig {
    CustodialConfig {
        api_url: api_url.to_string(),
        app_id: APP_ID.to_string(),
        app_secret: Some(APP_SECRET.to_string()),
        ..CustodialConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Fullnode
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FullnodeState {
    /// hash → number of lookups so far
    pub transactions: Mutex<HashMap<String, u32>>,
    pub submissions: Mutex<Vec<Vec<u8>>>,
    pub rejected: Mutex<u32>,
}

pub struct MockFullnode {
    pub url: String,
    pub state: Arc<FullnodeState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockFullnode {
    pub async fn start() -> Self {
        let state = Arc::new(FullnodeState::default());
        let router = Router::new()
            .route("/v1", get(ledger_info))
            .route("/v1/", get(ledger_info))
            .route("/v1/accounts/{address}", get(account))
            .route("/v1/estimate_gas_price", get(gas_price))
            .route("/v1/transactions", post(submit))
            .route("/v1/transactions/by_hash/{hash}", get(by_hash))
            .with_state(state.clone());
        let (base, handle) = serve_router(router).await;
        Self {
            url: format!("{base}/v1"),
            state,
            _handle: handle,
        }
    }

    pub fn submissions(&self) -> usize {
        self.state.submissions.lock().unwrap().len()
    }
}

async fn ledger_info() -> Json<Value> {
    Json(json!({
        "chain_id": CHAIN_ID,
        "epoch": "12",
        "ledger_version": "1000",
        "ledger_timestamp": "1700000000000000",
    }))
}

async fn account(Path(address): Path<String>) -> Response {
    if address == UNKNOWN_ACCOUNT {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Account not found", "error_code": "account_not_found" })),
        )
            .into_response();
    }
    Json(json!({ "sequence_number": "5", "authentication_key": address })).into_response()
}

async fn gas_price() -> Json<Value> {
    Json(json!({ "gas_estimate": 100 }))
}

async fn submit(
    State(state): State<Arc<FullnodeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type != "application/x.aptos.signed_transaction+bcs" || body.len() <= AUTHENTICATOR_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "expected BCS signed transaction" })),
        )
            .into_response();
    }

    let split = body.len() - AUTHENTICATOR_LEN;
    let (raw, auth) = body.split_at(split);
    let mut message = sha3_256(b"APTOS::RawTransaction").to_vec();
    message.extend_from_slice(raw);

    let verified = auth[0] == 0
        && auth[1] == 32
        && auth[34] == 64
        && <[u8; 32]>::try_from(&auth[2..34])
            .ok()
            .and_then(|key| VerifyingKey::from_bytes(&key).ok())
            .zip(<[u8; 64]>::try_from(&auth[35..]).ok())
            .is_some_and(|(key, sig)| key.verify(&message, &Signature::from_bytes(&sig)).is_ok());
    if !verified {
        *state.rejected.lock().unwrap() += 1;
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid transaction: INVALID_SIGNATURE" })),
        )
            .into_response();
    }

    let mut preimage = sha3_256(b"APTOS::Transaction").to_vec();
    preimage.push(0);
    preimage.extend_from_slice(&body);
    let hash = format!("0x{}", hex::encode(sha3_256(&preimage)));

    state.transactions.lock().unwrap().insert(hash.clone(), 0);
    state.submissions.lock().unwrap().push(body.to_vec());
    (StatusCode::ACCEPTED, Json(json!({ "hash": hash }))).into_response()
}

async fn by_hash(State(state): State<Arc<FullnodeState>>, Path(hash): Path<String>) -> Response {
    let mut transactions = state.transactions.lock().unwrap();
    let Some(lookups) = transactions.get_mut(&hash) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Transaction not found" })),
        )
            .into_response();
    };
    *lookups += 1;
    if *lookups == 1 {
        return Json(json!({ "type": "pending_transaction", "hash": hash })).into_response();
    }
    Json(json!({
        "type": "user_transaction",
        "hash": hash,
        "version": "1001",
        "success": true,
        "vm_status": "Executed successfully",
    }))
    .into_response()
}

// ---------------------------------------------------------------------------
// Custodial provider
// ---------------------------------------------------------------------------

pub struct ProviderState {
    pub key: SigningKey,
    pub sign_requests: Mutex<u32>,
}

pub struct MockProvider {
    pub url: String,
    pub state: Arc<ProviderState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockProvider {
    pub async fn start() -> Self {
        let state = Arc::new(ProviderState {
            key: SigningKey::from_bytes(&[42u8; 32]),
            sign_requests: Mutex::new(0),
        });
        let router = Router::new()
            .route("/v1/wallets/{wallet_id}", get(get_wallet))
            .route("/v1/wallets/{wallet_id}/rpc", post(wallet_rpc))
            .with_state(state.clone());
        let (url, handle) = serve_router(router).await;
        Self {
            url,
            state,
            _handle: handle,
        }
    }

    /// Public key as 64 hex characters, no prefix.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.state.key.verifying_key().to_bytes())
    }

    pub fn sign_requests(&self) -> u32 {
        *self.state.sign_requests.lock().unwrap()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let basic = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    let app_id = headers
        .get("privy-app-id")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == APP_ID);
    basic && app_id
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid app ID or app secret." })),
    )
        .into_response()
}

async fn get_wallet(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    // the provider reports the 32-byte key with a leading zero byte
    let public_key = format!("0x00{}", hex::encode(state.key.verifying_key().to_bytes()));
    match wallet_id.as_str() {
        WALLET_ID => Json(json!({
            "id": wallet_id,
            "address": WALLET_ADDRESS,
            "chain_type": "aptos",
            "public_key": public_key,
            "created_at": 1_700_000_000_000u64,
        }))
        .into_response(),
        KEYLESS_WALLET_ID => Json(json!({
            "id": wallet_id,
            "address": WALLET_ADDRESS,
            "chain_type": "aptos",
            "created_at": 1_700_000_000_000u64,
        }))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Wallet not found" })),
        )
            .into_response(),
    }
}

async fn wallet_rpc(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    Path(wallet_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if wallet_id != WALLET_ID || body["method"] != "raw_sign" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported request" })),
        )
            .into_response();
    }
    let Some(hash) = body["params"]["hash"].as_str() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "params.hash is required" })),
        )
            .into_response();
    };
    let Ok(bytes) = hex::decode(hash.trim_start_matches("0x")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "hash must be hex" })),
        )
            .into_response();
    };

    *state.sign_requests.lock().unwrap() += 1;
    let signature = state.key.sign(&bytes);
    Json(json!({
        "method": "raw_sign",
        "data": {
            "signature": format!("0x{}", hex::encode(signature.to_bytes())),
            "encoding": "hex",
        },
    }))
    .into_response()
}
