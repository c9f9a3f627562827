//! Provider-backed custodial wallet.
//!
//! Holds the session for one provider wallet id. `login` fetches the wallet
//! record and marks the session authenticated; `logout` clears it. Signing
//! goes straight to the provider's raw-sign call.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::custodial::client::{CustodialError, ProviderClient, ProviderWallet};
use crate::wallet::{BackendError, CustodialWallet, EmbeddedState, EmbeddedWalletRecord};

pub struct HttpCustodialWallet {
    client: ProviderClient,
    wallet_id: String,
    state: RwLock<EmbeddedState>,
}

impl HttpCustodialWallet {
    pub fn new(client: ProviderClient, wallet_id: &str) -> Self {
        Self {
            client,
            wallet_id: wallet_id.to_string(),
            state: RwLock::new(EmbeddedState::default()),
        }
    }

    /// Fetch the wallet record and open the session.
    pub async fn login(&self) -> Result<ProviderWallet, CustodialError> {
        let wallet = self.client.get_wallet(&self.wallet_id).await?;
        if wallet.public_key.as_deref().map_or(true, str::is_empty) {
            tracing::warn!(
                wallet_id = %self.wallet_id,
                address = %wallet.address,
                "Provider wallet has no public key"
            );
        }

        let record = EmbeddedWalletRecord {
            address: Some(wallet.address.clone()).filter(|a| !a.is_empty()),
            public_key: wallet.public_key.clone(),
            chain_type: wallet.chain_type.clone(),
        };
        *self.state.write().await = EmbeddedState {
            authenticated: true,
            wallet: Some(record),
            linked_accounts: Vec::new(),
        };

        tracing::info!(
            wallet_id = %self.wallet_id,
            address = %wallet.address,
            chain_type = %wallet.chain_type,
            "Custodial wallet session opened"
        );
        Ok(wallet)
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }
}

#[async_trait]
impl CustodialWallet for HttpCustodialWallet {
    async fn state(&self) -> EmbeddedState {
        self.state.read().await.clone()
    }

    async fn sign_raw_hash(
        &self,
        address: &str,
        chain_type: &str,
        hash: &str,
    ) -> Result<String, BackendError> {
        tracing::debug!(
            wallet_id = %self.wallet_id,
            address = %address,
            chain_type = %chain_type,
            "Requesting raw-hash signature"
        );
        self.client
            .raw_sign(&self.wallet_id, hash)
            .await
            .map_err(|e| BackendError::new(e.to_string()))
    }

    async fn logout(&self) -> Result<(), BackendError> {
        *self.state.write().await = EmbeddedState::default();
        tracing::info!(wallet_id = %self.wallet_id, "Custodial wallet session closed");
        Ok(())
    }
}
