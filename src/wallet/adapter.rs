//! Adapter-based signing.
//!
//! The adapter library validates networks against the handful it knows and
//! throws for ours. That failure is recognised here and surfaced as
//! [`WalletError::UnsupportedNetwork`] so the façade can decide what to do.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::wallet::error::{classify, BackendError, WalletError, WalletResult};
use crate::wallet::reply::{decode_reply, SignOutcome, SubmittedHash};
use crate::wallet::request::{TransactionRequest, TransactionResult};
use crate::wallet::session::{ConnectionState, WalletKind};
use crate::wallet::TransactionSigner;

const BACKEND: &str = "adapter";

/// A standards-compliant wallet adapter.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn state(&self) -> ConnectionState;

    /// Combined sign-and-submit, payload in the adapter's JSON form.
    async fn sign_and_submit_transaction(&self, payload: &Value) -> Result<Value, BackendError>;

    async fn disconnect(&self) -> Result<(), BackendError>;
}

#[derive(Clone)]
pub struct AdapterSigner {
    adapter: Arc<dyn WalletAdapter>,
}

impl AdapterSigner {
    pub fn new(adapter: Arc<dyn WalletAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Arc<dyn WalletAdapter> {
        &self.adapter
    }
}

#[async_trait]
impl TransactionSigner for AdapterSigner {
    fn kind(&self) -> WalletKind {
        WalletKind::Adapter
    }

    async fn sign_and_submit(&self, request: &TransactionRequest) -> WalletResult<TransactionResult> {
        if !self.adapter.state().await.is_active() {
            return Err(WalletError::NotConnected);
        }

        let reply = self
            .adapter
            .sign_and_submit_transaction(&request.to_wallet_payload())
            .await
            .map_err(|e| {
                let err = classify(BACKEND, e);
                tracing::debug!(adapter = self.adapter.name(), error = %err, "Adapter call failed");
                err
            })?;

        match decode_reply::<SubmittedHash>(BACKEND, reply)? {
            SignOutcome::Signed(hash) => Ok(TransactionResult::submitted(
                hash.into_hash(),
                WalletKind::Adapter,
            )),
            SignOutcome::Rejected => Err(WalletError::UserRejected),
        }
    }
}
