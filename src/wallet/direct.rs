//! Direct wallet-standard signing.
//!
//! Talks to an injected wallet's standard feature map directly instead of
//! going through the adapter library, which would reject our custom network.
//! The network descriptor is handed over on every connect and every
//! transaction.
//!
//! # Signing strategy
//! ```text
//! one-shot signAndSubmitTransaction (if advertised)
//!     ├─ Signed(hash)      → done
//!     ├─ Rejected          → UserRejected (never retried)
//!     ├─ unusable reply    → error (the wallet already answered)
//!     └─ call failed       → split path (if signTransaction advertised)
//! split path:
//!     build raw txn locally → signTransaction → Ed25519 authenticator
//!     → verify locally → submit through the chain client
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::chain::{
    AccountAddress, Ed25519PublicKey, Ed25519Signature, NetworkInfo, RawTransaction,
    SignedTransaction, TransactionAuthenticator, TxBuilder,
};
use crate::wallet::error::{classify, BackendError, WalletError, WalletResult};
use crate::wallet::reply::{decode_reply, SignOutcome, SubmittedHash, WalletAuthenticator};
use crate::wallet::request::{TransactionRequest, TransactionResult};
use crate::wallet::session::{AccountInfo, ConnectionState, WalletKind};
use crate::wallet::TransactionSigner;

const BACKEND: &str = "direct";

/// Optional features an injected wallet advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletFeatures {
    pub sign_and_submit: bool,
    pub sign_transaction: bool,
}

impl Default for WalletFeatures {
    fn default() -> Self {
        Self {
            sign_and_submit: true,
            sign_transaction: true,
        }
    }
}

/// An injected wallet reached through the wallet standard's feature map.
///
/// Replies are raw JSON; [`DirectSigner`] decodes them.
#[async_trait]
pub trait StandardWallet: Send + Sync {
    fn name(&self) -> &str;

    fn features(&self) -> WalletFeatures;

    async fn state(&self) -> ConnectionState;

    async fn connect(&self, network: &NetworkInfo) -> Result<Value, BackendError>;

    async fn disconnect(&self) -> Result<(), BackendError>;

    async fn sign_and_submit_transaction(
        &self,
        payload: &Value,
        network: &NetworkInfo,
    ) -> Result<Value, BackendError>;

    async fn sign_transaction(
        &self,
        raw_txn: &RawTransaction,
        network: &NetworkInfo,
    ) -> Result<Value, BackendError>;
}

/// Signing adapter for the direct wallet-standard path.
#[derive(Clone)]
pub struct DirectSigner {
    wallet: Arc<dyn StandardWallet>,
    builder: TxBuilder,
    network: NetworkInfo,
}

impl DirectSigner {
    pub fn new(wallet: Arc<dyn StandardWallet>, builder: TxBuilder) -> Self {
        let network = NetworkInfo::from_config(builder.config());
        Self {
            wallet,
            builder,
            network,
        }
    }

    pub fn wallet(&self) -> &Arc<dyn StandardWallet> {
        &self.wallet
    }

    /// Connect, announcing the custom network.
    pub async fn connect(&self) -> WalletResult<AccountInfo> {
        let reply = self
            .wallet
            .connect(&self.network)
            .await
            .map_err(|e| classify(BACKEND, e))?;
        match decode_reply::<AccountInfo>(BACKEND, reply)? {
            SignOutcome::Signed(account) => {
                tracing::info!(
                    wallet = self.wallet.name(),
                    address = %account.address,
                    network = %self.network.name,
                    chain_id = self.network.chain_id,
                    "Direct wallet connected"
                );
                Ok(account)
            }
            SignOutcome::Rejected => Err(WalletError::UserRejected),
        }
    }

    /// Decode the one-shot reply. The wallet has already answered, so a
    /// failure here must not lead to a second signature.
    fn submitted_hash(reply: Value) -> WalletResult<String> {
        match decode_reply::<SubmittedHash>(BACKEND, reply)? {
            SignOutcome::Signed(hash) => Ok(hash.into_hash()),
            SignOutcome::Rejected => Err(WalletError::UserRejected),
        }
    }

    async fn split(
        &self,
        account: &AccountInfo,
        request: &TransactionRequest,
    ) -> WalletResult<String> {
        let sender: AccountAddress = account.address.parse()?;
        let raw = self.builder.build(sender, request.entry_function()?).await?;
        let message = raw.signing_message()?;

        let reply = self
            .wallet
            .sign_transaction(&raw, &self.network)
            .await
            .map_err(|e| classify(BACKEND, e))?;
        let signed = match decode_reply::<WalletAuthenticator>(BACKEND, reply)? {
            SignOutcome::Signed(auth) => auth,
            SignOutcome::Rejected => return Err(WalletError::UserRejected),
        };

        let public_key_hex = signed
            .public_key
            .as_deref()
            .or(account.public_key.as_deref())
            .ok_or_else(|| WalletError::Backend {
                backend: BACKEND,
                message: "wallet did not expose a public key".to_string(),
            })?;
        let authenticator = TransactionAuthenticator::ed25519(
            Ed25519PublicKey::from_hex(public_key_hex)?,
            Ed25519Signature::from_hex(&signed.signature)?,
        );
        if !authenticator.verify(&message) {
            return Err(WalletError::InvalidSignature(self.wallet.name().to_string()));
        }

        let txn = SignedTransaction::new(raw, authenticator);
        Ok(self.builder.ledger().submit(&txn).await?)
    }
}

#[async_trait]
impl TransactionSigner for DirectSigner {
    fn kind(&self) -> WalletKind {
        WalletKind::Direct
    }

    async fn sign_and_submit(&self, request: &TransactionRequest) -> WalletResult<TransactionResult> {
        let state = self.wallet.state().await;
        let account = match (state.connected, state.account) {
            (true, Some(account)) => account,
            _ => return Err(WalletError::NotConnected),
        };
        let features = self.wallet.features();

        if features.sign_and_submit {
            let reply = self
                .wallet
                .sign_and_submit_transaction(&request.to_wallet_payload(), &self.network)
                .await;
            match reply {
                Ok(reply) => {
                    let hash = Self::submitted_hash(reply)?;
                    return Ok(TransactionResult::submitted(hash, WalletKind::Direct));
                }
                Err(e) => match classify(BACKEND, e) {
                    WalletError::UserRejected => return Err(WalletError::UserRejected),
                    e if features.sign_transaction => {
                        tracing::warn!(
                            wallet = self.wallet.name(),
                            error = %e,
                            "One-shot signing failed, retrying with split sign/submit"
                        );
                    }
                    e => return Err(e),
                },
            }
        } else if !features.sign_transaction {
            return Err(WalletError::Backend {
                backend: BACKEND,
                message: format!("{} exposes no signing feature", self.wallet.name()),
            });
        }

        let hash = self.split(&account, request).await?;
        Ok(TransactionResult::submitted(hash, WalletKind::Direct))
    }
}
