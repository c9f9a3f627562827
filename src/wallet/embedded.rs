//! Embedded (custodial) wallet signing.
//!
//! The provider only signs raw hashes, so the whole transaction lifecycle
//! runs here:
//!
//! ```text
//! validate address + public key      (no network before this passes)
//!     → build raw txn                (sequence number, gas price)
//!     → signing message              (sha3(salt) || bcs(raw))
//!     → provider raw-hash signature
//!     → Ed25519 authenticator        (verified locally)
//!     → submit
//!     → wait for settlement          (bounded by chain.settlement_timeout_secs)
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::chain::{
    AccountAddress, Ed25519PublicKey, Ed25519Signature, SignedTransaction,
    TransactionAuthenticator, TxBuilder,
};
use crate::wallet::error::{classify, BackendError, WalletError, WalletResult};
use crate::wallet::keys::{parse_account_address, parse_public_key};
use crate::wallet::request::{TransactionRequest, TransactionResult};
use crate::wallet::session::{EmbeddedState, WalletKind};
use crate::wallet::TransactionSigner;

const BACKEND: &str = "embedded";

/// Client-side view of the custodial provider.
#[async_trait]
pub trait CustodialWallet: Send + Sync {
    async fn state(&self) -> EmbeddedState;

    /// Sign `hash` (0x-prefixed hex) with the wallet at `address`,
    /// returning a 0x-prefixed signature.
    async fn sign_raw_hash(
        &self,
        address: &str,
        chain_type: &str,
        hash: &str,
    ) -> Result<String, BackendError>;

    async fn logout(&self) -> Result<(), BackendError>;
}

#[derive(Clone)]
pub struct EmbeddedSigner {
    wallet: Arc<dyn CustodialWallet>,
    builder: TxBuilder,
    chain_type: String,
}

impl EmbeddedSigner {
    pub fn new(wallet: Arc<dyn CustodialWallet>, builder: TxBuilder, chain_type: &str) -> Self {
        Self {
            wallet,
            builder,
            chain_type: chain_type.to_string(),
        }
    }

    pub fn wallet(&self) -> &Arc<dyn CustodialWallet> {
        &self.wallet
    }

    /// Pull a usable address and key out of the provider state.
    fn key_material(&self, state: &EmbeddedState) -> WalletResult<(AccountAddress, Ed25519PublicKey)> {
        if !state.authenticated {
            return Err(WalletError::NotConnected);
        }
        let record = state
            .wallet_for(&self.chain_type)
            .ok_or(WalletError::NotConnected)?;

        let address_str = record
            .address
            .filter(|a| !a.trim().is_empty())
            .ok_or(WalletError::EmbeddedWalletPending)?;
        let address = parse_account_address(&address_str)
            .map_err(|e| WalletError::InvalidKeyMaterial(format!("address {}: {}", address_str, e)))?;

        let public_key_str = record
            .public_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| WalletError::MissingKeyMaterial {
                address: address_str.clone(),
            })?;
        let public_key = parse_public_key(&public_key_str)
            .map_err(|e| WalletError::InvalidKeyMaterial(format!("public key: {}", e)))?;

        Ok((address, public_key))
    }
}

#[async_trait]
impl TransactionSigner for EmbeddedSigner {
    fn kind(&self) -> WalletKind {
        WalletKind::Embedded
    }

    async fn sign_and_submit(&self, request: &TransactionRequest) -> WalletResult<TransactionResult> {
        let state = self.wallet.state().await;
        let (sender, public_key) = self.key_material(&state)?;
        let entry = request.entry_function()?;

        let raw = self.builder.build(sender, entry).await?;
        let message = raw.signing_message()?;
        let message_hex = format!("0x{}", hex::encode(&message));

        let signature_hex = self
            .wallet
            .sign_raw_hash(&sender.to_string(), &self.chain_type, &message_hex)
            .await
            .map_err(|e| classify(BACKEND, e))?;
        let signature = Ed25519Signature::from_hex(&signature_hex)
            .map_err(|_| WalletError::InvalidSignature(format!("embedded wallet {}", sender)))?;

        let authenticator = TransactionAuthenticator::ed25519(public_key, signature);
        if !authenticator.verify(&message) {
            return Err(WalletError::InvalidSignature(format!("embedded wallet {}", sender)));
        }

        let txn = SignedTransaction::new(raw, authenticator);
        let hash = self.builder.ledger().submit(&txn).await?;
        tracing::info!(
            tx_hash = %hash,
            sender = %sender,
            function = %request.function(),
            "Embedded transaction submitted, waiting for settlement"
        );

        let settlement = self.builder.wait_for_settlement(&hash).await?;
        if !settlement.success {
            tracing::warn!(tx_hash = %hash, vm_status = %settlement.vm_status, "Transaction aborted");
        }

        Ok(TransactionResult {
            hash: settlement.hash,
            success: settlement.success,
            vm_status: Some(settlement.vm_status),
            wallet: WalletKind::Embedded,
        })
    }
}
