//! In-memory backends shared by the wallet unit tests.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::chain::{
    AccountAddress, ChainConfig, ChainError, ChainResult, Ledger, NetworkInfo, RawTransaction,
    SignedTransaction, TransactionStatus,
};
use crate::wallet::adapter::WalletAdapter;
use crate::wallet::direct::{StandardWallet, WalletFeatures};
use crate::wallet::embedded::CustodialWallet;
use crate::wallet::error::BackendError;
use crate::wallet::session::{AccountInfo, ConnectionState, EmbeddedState, EmbeddedWalletRecord};

pub const EMBEDDED_ADDRESS: &str =
    "0x00000000000000000000000000000000000000000000000000000000000e0b01";
pub const INJECTED_ADDRESS: &str =
    "0x0000000000000000000000000000000000000000000000000000000000a11ce0";

pub fn chain_config() -> ChainConfig {
    ChainConfig {
        gas_unit_price: Some(100),
        settlement_timeout_secs: 5,
        poll_base_delay_ms: 1,
        poll_max_delay_ms: 5,
        ..ChainConfig::default()
    }
}

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn public_key_hex(key: &SigningKey) -> String {
    format!("0x{}", hex::encode(key.verifying_key().to_bytes()))
}

/// Ledger that verifies every submission and settles it on the first poll.
#[derive(Default)]
pub struct MockLedger {
    pub calls: AtomicUsize,
    pub submitted: Mutex<Vec<SignedTransaction>>,
    pub abort: bool,
}

impl MockLedger {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn chain_id(&self) -> ChainResult<u8> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChainConfig::default().chain_id)
    }

    async fn sequence_number(&self, _address: AccountAddress) -> ChainResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(7)
    }

    async fn gas_unit_price(&self) -> ChainResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(100)
    }

    async fn submit(&self, txn: &SignedTransaction) -> ChainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !txn.authenticator.verify(&txn.raw_txn.signing_message()?) {
            return Err(ChainError::Http {
                status: 400,
                message: "INVALID_SIGNATURE".into(),
            });
        }
        let hash = txn.committed_hash()?;
        self.submitted.lock().unwrap().push(txn.clone());
        Ok(hash)
    }

    async fn transaction_status(&self, _hash: &str) -> ChainResult<TransactionStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TransactionStatus::Committed {
            version: 11,
            success: !self.abort,
            vm_status: if self.abort {
                "Move abort in 0xc::members: EALREADY_MEMBER(0x1)".into()
            } else {
                "Executed successfully".into()
            },
        })
    }
}

/// Custodial provider that signs raw hashes with a local key.
pub struct MockCustodial {
    pub state: EmbeddedState,
    pub key: SigningKey,
    pub sign_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub fail_logout: bool,
}

impl MockCustodial {
    pub fn ready(key: SigningKey) -> Self {
        let state = EmbeddedState {
            authenticated: true,
            wallet: Some(EmbeddedWalletRecord {
                address: Some(EMBEDDED_ADDRESS.to_string()),
                public_key: Some(public_key_hex(&key)),
                chain_type: "aptos".to_string(),
            }),
            linked_accounts: Vec::new(),
        };
        Self::with_state(key, state)
    }

    pub fn with_state(key: SigningKey, state: EmbeddedState) -> Self {
        Self {
            state,
            key,
            sign_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            fail_logout: false,
        }
    }

    pub fn signed(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustodialWallet for MockCustodial {
    async fn state(&self) -> EmbeddedState {
        self.state.clone()
    }

    async fn sign_raw_hash(
        &self,
        _address: &str,
        _chain_type: &str,
        hash: &str,
    ) -> Result<String, BackendError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let bytes = hex::decode(hash.trim_start_matches("0x"))
            .map_err(|e| BackendError::new(e.to_string()))?;
        Ok(format!("0x{}", hex::encode(self.key.sign(&bytes).to_bytes())))
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            return Err(BackendError::new("provider session already expired"));
        }
        Ok(())
    }
}

/// Adapter whose combined call either fails with `error` or returns a hash.
pub struct MockAdapter {
    pub state: ConnectionState,
    pub error: Option<String>,
    pub calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub fail_disconnect: bool,
}

impl MockAdapter {
    pub fn connected(error: Option<&str>) -> Self {
        Self {
            state: ConnectionState::connected(AccountInfo {
                address: INJECTED_ADDRESS.to_string(),
                public_key: None,
            }),
            ..Self::disconnected(error)
        }
    }

    pub fn disconnected(error: Option<&str>) -> Self {
        Self {
            state: ConnectionState::default(),
            error: error.map(str::to_string),
            calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            fail_disconnect: false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletAdapter for MockAdapter {
    fn name(&self) -> &str {
        "MockAdapter"
    }

    async fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    async fn sign_and_submit_transaction(&self, _payload: &Value) -> Result<Value, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(BackendError::new(message.clone())),
            None => Ok(json!({ "hash": format!("0x{}", "ad".repeat(32)) })),
        }
    }

    async fn disconnect(&self) -> Result<(), BackendError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect {
            return Err(BackendError::new("adapter not initialised"));
        }
        Ok(())
    }
}

/// Injected wallet with a configurable one-shot reply and a real key for
/// the split path.
pub struct MockStandardWallet {
    pub state: ConnectionState,
    pub features: WalletFeatures,
    pub one_shot: Result<Value, String>,
    pub key: SigningKey,
    pub expose_key: bool,
    pub one_shot_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub networks: Mutex<Vec<NetworkInfo>>,
}

impl MockStandardWallet {
    pub fn connected(one_shot: Result<Value, String>) -> Self {
        let key = signing_key(3);
        Self {
            state: ConnectionState::connected(AccountInfo {
                address: INJECTED_ADDRESS.to_string(),
                public_key: Some(public_key_hex(&key)),
            }),
            features: WalletFeatures::default(),
            one_shot,
            key,
            expose_key: true,
            one_shot_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            networks: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            state: ConnectionState::default(),
            ..Self::connected(Err("not connected".into()))
        }
    }

    pub fn one_shots(&self) -> usize {
        self.one_shot_calls.load(Ordering::SeqCst)
    }

    pub fn splits(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StandardWallet for MockStandardWallet {
    fn name(&self) -> &str {
        "MockWallet"
    }

    fn features(&self) -> WalletFeatures {
        self.features
    }

    async fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    async fn connect(&self, network: &NetworkInfo) -> Result<Value, BackendError> {
        self.networks.lock().unwrap().push(network.clone());
        let account = self.state.account.clone().unwrap_or_default();
        Ok(json!({ "status": "Approved", "args": account }))
    }

    async fn disconnect(&self) -> Result<(), BackendError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_and_submit_transaction(
        &self,
        _payload: &Value,
        network: &NetworkInfo,
    ) -> Result<Value, BackendError> {
        self.one_shot_calls.fetch_add(1, Ordering::SeqCst);
        self.networks.lock().unwrap().push(network.clone());
        self.one_shot.clone().map_err(BackendError::new)
    }

    async fn sign_transaction(
        &self,
        raw_txn: &RawTransaction,
        network: &NetworkInfo,
    ) -> Result<Value, BackendError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.networks.lock().unwrap().push(network.clone());
        let message = raw_txn
            .signing_message()
            .map_err(|e| BackendError::new(e.to_string()))?;
        let signature = format!("0x{}", hex::encode(self.key.sign(&message).to_bytes()));
        let reply = if self.expose_key {
            json!({ "publicKey": public_key_hex(&self.key), "signature": signature })
        } else {
            json!({ "signature": signature })
        };
        Ok(json!({ "status": "Approved", "args": reply }))
    }
}
