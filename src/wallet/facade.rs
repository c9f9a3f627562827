//! Unified wallet façade.
//!
//! # Responsibilities
//! - Observe all configured backends and resolve the authoritative session
//! - Dispatch each request to the matching signer
//! - Apply the fallback table when the resolved signer fails
//! - Tear down every backend on disconnect
//!
//! # Data Flow
//! ```text
//! sign_and_submit(request)
//!     → snapshot()   (state of direct, adapter, embedded)
//!     → resolve()    (direct > adapter > embedded > none)
//!     → signer.sign_and_submit()
//!     → on error: fallback_for(kind, error)
//!         ├─ Some(embedded) + embedded session → one retry via embedded
//!         ├─ Some(embedded), no session        → NetworkFallbackUnavailable
//!         └─ None                              → error unchanged
//! ```

use futures_util::future::join3;
use std::sync::Arc;
use tracing::Instrument;

use crate::chain::{NetworkInfo, TxBuilder};
use crate::config::ExplorerConfig;
use crate::observability::metrics;
use crate::wallet::adapter::{AdapterSigner, WalletAdapter};
use crate::wallet::direct::{DirectSigner, StandardWallet};
use crate::wallet::embedded::{CustodialWallet, EmbeddedSigner};
use crate::wallet::error::{BackendError, WalletError, WalletResult};
use crate::wallet::fallback::fallback_for;
use crate::wallet::request::{TransactionRequest, TransactionResult};
use crate::wallet::session::{
    resolve, AccountInfo, BackendSnapshot, ConnectionState, EmbeddedState, WalletKind,
    WalletSession,
};
use crate::wallet::TransactionSigner;

/// Single entry point for every mutation.
#[derive(Clone)]
pub struct UnifiedWallet {
    direct: Option<DirectSigner>,
    adapter: Option<AdapterSigner>,
    embedded: Option<EmbeddedSigner>,
    chain_type: String,
    network: NetworkInfo,
    explorer: Option<ExplorerConfig>,
}

pub struct UnifiedWalletBuilder {
    builder: TxBuilder,
    chain_type: String,
    explorer: Option<ExplorerConfig>,
    direct: Option<Arc<dyn StandardWallet>>,
    adapter: Option<Arc<dyn WalletAdapter>>,
    embedded: Option<Arc<dyn CustodialWallet>>,
}

impl UnifiedWalletBuilder {
    pub fn direct(mut self, wallet: Arc<dyn StandardWallet>) -> Self {
        self.direct = Some(wallet);
        self
    }

    pub fn adapter(mut self, adapter: Arc<dyn WalletAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn embedded(mut self, wallet: Arc<dyn CustodialWallet>) -> Self {
        self.embedded = Some(wallet);
        self
    }

    pub fn explorer(mut self, explorer: ExplorerConfig) -> Self {
        self.explorer = Some(explorer);
        self
    }

    pub fn build(self) -> UnifiedWallet {
        let network = NetworkInfo::from_config(self.builder.config());
        UnifiedWallet {
            direct: self
                .direct
                .map(|w| DirectSigner::new(w, self.builder.clone())),
            adapter: self.adapter.map(AdapterSigner::new),
            embedded: self
                .embedded
                .map(|w| EmbeddedSigner::new(w, self.builder.clone(), &self.chain_type)),
            chain_type: self.chain_type,
            network,
            explorer: self.explorer,
        }
    }
}

impl UnifiedWallet {
    pub fn builder(builder: TxBuilder, chain_type: &str) -> UnifiedWalletBuilder {
        UnifiedWalletBuilder {
            builder,
            chain_type: chain_type.to_string(),
            explorer: None,
            direct: None,
            adapter: None,
            embedded: None,
        }
    }

    /// Current state of every configured backend. Missing backends read as
    /// disconnected.
    pub async fn snapshot(&self) -> BackendSnapshot {
        let direct = async {
            match &self.direct {
                Some(s) => s.wallet().state().await,
                None => ConnectionState::default(),
            }
        };
        let adapter = async {
            match &self.adapter {
                Some(s) => s.adapter().state().await,
                None => ConnectionState::default(),
            }
        };
        let embedded = async {
            match &self.embedded {
                Some(s) => s.wallet().state().await,
                None => EmbeddedState::default(),
            }
        };
        let (direct, adapter, embedded) = join3(direct, adapter, embedded).await;
        BackendSnapshot {
            direct,
            adapter,
            embedded,
        }
    }

    /// The authoritative session, recomputed on every call.
    pub async fn session(&self) -> WalletSession {
        resolve(&self.snapshot().await, &self.chain_type)
    }

    /// Connect the direct wallet with the custom network descriptor.
    pub async fn connect_direct(&self) -> WalletResult<AccountInfo> {
        match &self.direct {
            Some(signer) => signer.connect().await,
            None => Err(WalletError::NotConnected),
        }
    }

    fn signer(&self, kind: WalletKind) -> Option<&dyn TransactionSigner> {
        match kind {
            WalletKind::Direct => self.direct.as_ref().map(|s| s as &dyn TransactionSigner),
            WalletKind::Adapter => self.adapter.as_ref().map(|s| s as &dyn TransactionSigner),
            WalletKind::Embedded => self.embedded.as_ref().map(|s| s as &dyn TransactionSigner),
            WalletKind::None => None,
        }
    }

    async fn dispatch(
        &self,
        kind: WalletKind,
        request: &TransactionRequest,
    ) -> WalletResult<TransactionResult> {
        match self.signer(kind) {
            Some(signer) => signer.sign_and_submit(request).await,
            None => Err(WalletError::NotConnected),
        }
    }

    /// Sign and submit through whichever backend is authoritative.
    pub async fn sign_and_submit(
        &self,
        request: &TransactionRequest,
    ) -> WalletResult<TransactionResult> {
        let snapshot = self.snapshot().await;
        let kind = resolve(&snapshot, &self.chain_type).kind;
        let span = tracing::info_span!(
            "sign_and_submit",
            wallet = %kind,
            function = %request.function(),
        );

        async move {
            let result = match self.dispatch(kind, request).await {
                Ok(result) => Ok(result),
                Err(err) => match fallback_for(kind, &err) {
                    Some(target) => self.fall_back(kind, target, err, &snapshot, request).await,
                    None => Err(err),
                },
            };

            match &result {
                Ok(res) => {
                    metrics::record_sign_request(res.wallet.as_str(), "ok");
                    tracing::info!(tx_hash = %res.hash, success = res.success, via = %res.wallet, "Transaction submitted");
                }
                Err(e) => {
                    metrics::record_sign_request(kind.as_str(), e.label());
                    tracing::warn!(error = %e, "Transaction failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn fall_back(
        &self,
        from: WalletKind,
        target: WalletKind,
        err: WalletError,
        snapshot: &BackendSnapshot,
        request: &TransactionRequest,
    ) -> WalletResult<TransactionResult> {
        let available = match target {
            WalletKind::Embedded => {
                self.embedded.is_some() && snapshot.embedded.is_active(&self.chain_type)
            }
            _ => false,
        };

        if !available {
            let reason = match err {
                WalletError::UnsupportedNetwork(reason) => reason,
                other => other.to_string(),
            };
            tracing::warn!(from = %from, to = %target, reason = %reason, "No session to fall back to");
            return Err(WalletError::NetworkFallbackUnavailable {
                network: self.network.name.clone(),
                reason,
            });
        }

        tracing::info!(from = %from, to = %target, error = %err, "Falling back to another wallet");
        metrics::record_fallback(from.as_str(), target.as_str());
        self.dispatch(target, request).await
    }

    /// Tear down every configured backend, whichever one is active.
    ///
    /// Individual failures are logged and counted, never returned.
    pub async fn disconnect(&self) {
        let direct = async {
            match &self.direct {
                Some(s) => s.wallet().disconnect().await,
                None => Ok(()),
            }
        };
        let adapter = async {
            match &self.adapter {
                Some(s) => s.adapter().disconnect().await,
                None => Ok(()),
            }
        };
        let embedded = async {
            match &self.embedded {
                Some(s) => s.wallet().logout().await,
                None => Ok(()),
            }
        };

        let (direct, adapter, embedded) = join3(direct, adapter, embedded).await;
        for (backend, result) in [
            (WalletKind::Direct, direct),
            (WalletKind::Adapter, adapter),
            (WalletKind::Embedded, embedded),
        ] {
            log_teardown(backend, result);
        }
        tracing::info!("Wallet session cleared");
    }

    /// Explorer link for a transaction hash, if an explorer is configured.
    pub fn explorer_url(&self, hash: &str) -> Option<String> {
        self.explorer.as_ref().map(|e| e.transaction_url(hash))
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }
}

fn log_teardown(backend: WalletKind, result: Result<(), BackendError>) {
    if let Err(e) = result {
        tracing::warn!(backend = %backend, error = %e, "Teardown failed, continuing");
        metrics::record_teardown_failure(backend.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{AccountAddress, Ledger, MoveValue};
    use crate::wallet::session::EmbeddedWalletRecord;
    use crate::wallet::testing::*;
    use serde_json::json;

    const NETWORK_REJECTION: &str =
        "Invalid network, network custom not supported with Petra wallet";

    fn membership_request() -> TransactionRequest {
        let registry: AccountAddress = "0xC".parse().unwrap();
        TransactionRequest::parse(
            "0xC::members::request_membership",
            vec![
                MoveValue::Address(registry),
                MoveValue::U8(0),
                MoveValue::Bytes(b"hello from the garden".to_vec()),
            ],
        )
        .unwrap()
    }

    fn tx_builder(ledger: &Arc<MockLedger>) -> TxBuilder {
        TxBuilder::new(ledger.clone() as Arc<dyn Ledger>, chain_config())
    }

    fn assert_hash_shape(hash: &str) {
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert!(hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_request_membership_via_embedded() {
        let ledger = Arc::new(MockLedger::default());
        let custodial = Arc::new(MockCustodial::ready(signing_key(9)));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .embedded(custodial.clone())
            .build();

        let result = wallet.sign_and_submit(&membership_request()).await.unwrap();

        assert_hash_shape(&result.hash);
        assert!(result.success);
        assert_eq!(result.wallet, WalletKind::Embedded);
        assert_eq!(result.vm_status.as_deref(), Some("Executed successfully"));
        assert_eq!(custodial.signed(), 1);
        assert_eq!(ledger.submissions(), 1);

        let submitted = ledger.submitted.lock().unwrap()[0].clone();
        assert_eq!(submitted.raw_txn.sender.to_string(), EMBEDDED_ADDRESS);
        assert_eq!(submitted.committed_hash().unwrap(), result.hash);
    }

    #[tokio::test]
    async fn test_aborted_transaction_reports_failure() {
        let ledger = Arc::new(MockLedger {
            abort: true,
            ..MockLedger::default()
        });
        let custodial = Arc::new(MockCustodial::ready(signing_key(9)));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .embedded(custodial)
            .build();

        let result = wallet.sign_and_submit(&membership_request()).await.unwrap();
        assert!(!result.success);
        assert!(result.vm_status.unwrap().contains("EALREADY_MEMBER"));
    }

    #[tokio::test]
    async fn test_unsupported_network_falls_back_to_embedded_once() {
        let ledger = Arc::new(MockLedger::default());
        let adapter = Arc::new(MockAdapter::connected(Some(NETWORK_REJECTION)));
        let custodial = Arc::new(MockCustodial::ready(signing_key(9)));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .adapter(adapter.clone())
            .embedded(custodial.clone())
            .build();

        assert_eq!(wallet.session().await.kind, WalletKind::Adapter);
        let result = wallet.sign_and_submit(&membership_request()).await.unwrap();

        assert_eq!(result.wallet, WalletKind::Embedded);
        assert!(result.success);
        assert_eq!(adapter.calls(), 1);
        assert_eq!(custodial.signed(), 1);
        assert_eq!(ledger.submissions(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_network_without_embedded_is_combined_error() {
        let ledger = Arc::new(MockLedger::default());
        let adapter = Arc::new(MockAdapter::connected(Some(NETWORK_REJECTION)));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .adapter(adapter.clone())
            .build();

        let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
        let WalletError::NetworkFallbackUnavailable { network, reason } = &err else {
            panic!("expected combined error, got {err:?}");
        };
        assert_eq!(network, "custom");
        assert_eq!(reason, NETWORK_REJECTION);
        let message = err.to_string();
        assert!(message.contains("browser wallet's settings"));
        assert!(message.contains("embedded wallet"));
        assert_eq!(adapter.calls(), 1);
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_embedded_does_not_count_as_session() {
        let ledger = Arc::new(MockLedger::default());
        let adapter = Arc::new(MockAdapter::connected(Some(NETWORK_REJECTION)));
        let custodial = Arc::new(MockCustodial::with_state(
            signing_key(9),
            EmbeddedState::default(),
        ));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .adapter(adapter)
            .embedded(custodial.clone())
            .build();

        let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
        assert!(matches!(err, WalletError::NetworkFallbackUnavailable { .. }));
        assert_eq!(custodial.signed(), 0);
    }

    #[tokio::test]
    async fn test_other_adapter_failures_propagate() {
        let ledger = Arc::new(MockLedger::default());
        let custodial = Arc::new(MockCustodial::ready(signing_key(9)));

        for (message, rejected) in [
            ("User rejected the request", true),
            ("Simulation failed: EINSUFFICIENT_BALANCE", false),
        ] {
            let adapter = Arc::new(MockAdapter::connected(Some(message)));
            let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
                .adapter(adapter)
                .embedded(custodial.clone())
                .build();
            let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
            if rejected {
                assert!(matches!(err, WalletError::UserRejected));
            } else {
                assert!(err.to_string().contains("EINSUFFICIENT_BALANCE"));
            }
        }
        assert_eq!(custodial.signed(), 0);
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_public_key_fails_before_network() {
        for public_key in [None, Some(String::new())] {
            let ledger = Arc::new(MockLedger::default());
            let custodial = Arc::new(MockCustodial::with_state(
                signing_key(9),
                EmbeddedState {
                    authenticated: true,
                    wallet: Some(EmbeddedWalletRecord {
                        address: Some(EMBEDDED_ADDRESS.to_string()),
                        public_key,
                        chain_type: "aptos".into(),
                    }),
                    linked_accounts: Vec::new(),
                },
            ));
            let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
                .embedded(custodial.clone())
                .build();

            let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
            let WalletError::MissingKeyMaterial { address } = &err else {
                panic!("expected missing key material, got {err:?}");
            };
            assert_eq!(address, EMBEDDED_ADDRESS);
            assert!(err.to_string().contains("sign in again"));
            assert_eq!(ledger.calls(), 0);
            assert_eq!(custodial.signed(), 0);
        }
    }

    #[tokio::test]
    async fn test_pending_embedded_wallet_fails_fast() {
        let ledger = Arc::new(MockLedger::default());
        let custodial = Arc::new(MockCustodial::with_state(
            signing_key(9),
            EmbeddedState {
                authenticated: true,
                wallet: Some(EmbeddedWalletRecord::default()),
                linked_accounts: Vec::new(),
            },
        ));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .embedded(custodial)
            .build();

        assert_eq!(wallet.session().await.kind, WalletKind::Embedded);
        let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
        assert!(matches!(err, WalletError::EmbeddedWalletPending));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_key_material_is_not_missing() {
        let ledger = Arc::new(MockLedger::default());
        let custodial = Arc::new(MockCustodial::with_state(
            signing_key(9),
            EmbeddedState {
                authenticated: true,
                wallet: Some(EmbeddedWalletRecord {
                    address: Some(EMBEDDED_ADDRESS.to_string()),
                    public_key: Some(format!("0x{}", "ab".repeat(40))),
                    chain_type: "aptos".into(),
                }),
                linked_accounts: Vec::new(),
            },
        ));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .embedded(custodial)
            .build();

        let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidKeyMaterial(_)));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_nothing_connected() {
        let ledger = Arc::new(MockLedger::default());
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .direct(Arc::new(MockStandardWallet::disconnected()))
            .adapter(Arc::new(MockAdapter::disconnected(None)))
            .build();

        assert_eq!(wallet.session().await, WalletSession::none());
        let err = wallet.sign_and_submit(&membership_request()).await.unwrap_err();
        assert!(matches!(err, WalletError::NotConnected));
    }

    #[tokio::test]
    async fn test_direct_wins_over_embedded() {
        let ledger = Arc::new(MockLedger::default());
        let direct = Arc::new(MockStandardWallet::connected(Ok(json!({
            "status": "Approved",
            "args": { "hash": format!("0x{}", "d1".repeat(32)) }
        }))));
        let custodial = Arc::new(MockCustodial::ready(signing_key(9)));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .direct(direct.clone())
            .embedded(custodial.clone())
            .build();

        let result = wallet.sign_and_submit(&membership_request()).await.unwrap();
        assert_eq!(result.wallet, WalletKind::Direct);
        assert_eq!(result.hash, format!("0x{}", "d1".repeat(32)));
        assert_eq!(direct.one_shots(), 1);
        assert_eq!(custodial.signed(), 0);
        assert_eq!(direct.networks.lock().unwrap()[0].name, "custom");
    }

    #[tokio::test]
    async fn test_disconnect_tears_down_every_backend() {
        let ledger = Arc::new(MockLedger::default());
        let direct = Arc::new(MockStandardWallet::connected(Err("unused".into())));
        let adapter = Arc::new(MockAdapter {
            fail_disconnect: true,
            ..MockAdapter::disconnected(None)
        });
        let custodial = Arc::new(MockCustodial {
            fail_logout: true,
            ..MockCustodial::with_state(signing_key(9), EmbeddedState::default())
        });
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .direct(direct.clone())
            .adapter(adapter.clone())
            .embedded(custodial.clone())
            .build();

        assert_eq!(wallet.session().await.kind, WalletKind::Direct);
        wallet.disconnect().await;

        assert_eq!(direct.disconnects(), 1);
        assert_eq!(adapter.disconnects(), 1);
        assert_eq!(custodial.logouts(), 1);
    }

    #[tokio::test]
    async fn test_connect_direct() {
        let ledger = Arc::new(MockLedger::default());
        let direct = Arc::new(MockStandardWallet::connected(Err("unused".into())));
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .direct(direct.clone())
            .build();

        let account = wallet.connect_direct().await.unwrap();
        assert_eq!(account.address, INJECTED_ADDRESS);
        assert_eq!(direct.networks.lock().unwrap()[0].name, "custom");

        let without = UnifiedWallet::builder(tx_builder(&ledger), "aptos").build();
        assert!(matches!(
            without.connect_direct().await,
            Err(WalletError::NotConnected)
        ));
    }

    #[test]
    fn test_explorer_url() {
        let ledger = Arc::new(MockLedger::default());
        let wallet = UnifiedWallet::builder(tx_builder(&ledger), "aptos")
            .explorer(ExplorerConfig::default())
            .build();
        let url = wallet.explorer_url("0xabc").unwrap();
        assert!(url.ends_with("/txn/0xabc?network=bardock+testnet"));

        let bare = UnifiedWallet::builder(tx_builder(&ledger), "aptos").build();
        assert!(bare.explorer_url("0xabc").is_none());
    }
}
