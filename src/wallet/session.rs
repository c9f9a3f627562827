//! Wallet session resolution.
//!
//! Three backends keep their own connection state. The authoritative session
//! is never stored; it is recomputed from a [`BackendSnapshot`] by
//! [`resolve`] whenever someone needs it, so it cannot drift from its
//! sources.

use serde::{Deserialize, Serialize};

/// Which backend is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    None,
    Adapter,
    Direct,
    Embedded,
}

impl WalletKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::None => "none",
            WalletKind::Adapter => "adapter",
            WalletKind::Direct => "direct",
            WalletKind::Embedded => "embedded",
        }
    }
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account as reported by an injected wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Observed state of an injected wallet (direct or through the adapter).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub account: Option<AccountInfo>,
}

impl ConnectionState {
    pub fn connected(account: AccountInfo) -> Self {
        Self {
            connected: true,
            account: Some(account),
        }
    }

    /// Connected flag and account must both be present.
    pub fn is_active(&self) -> bool {
        self.connected && self.account.is_some()
    }
}

/// Wallet object the custodial provider created for the user.
///
/// `address` is `None` while creation is still pending or after it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedWalletRecord {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub chain_type: String,
}

/// Account linked to the provider user (wallets of any chain family).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub chain_type: String,
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Observed state of the custodial provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedState {
    pub authenticated: bool,
    pub wallet: Option<EmbeddedWalletRecord>,
    pub linked_accounts: Vec<LinkedAccount>,
}

impl EmbeddedState {
    /// The wallet record to sign with: the wallet object if there is one,
    /// otherwise a linked account of `chain_type`.
    pub fn wallet_for(&self, chain_type: &str) -> Option<EmbeddedWalletRecord> {
        if let Some(wallet) = &self.wallet {
            return Some(wallet.clone());
        }
        self.linked_accounts
            .iter()
            .find(|a| a.chain_type.eq_ignore_ascii_case(chain_type))
            .map(|a| EmbeddedWalletRecord {
                address: Some(a.address.clone()),
                public_key: a.public_key.clone(),
                chain_type: a.chain_type.clone(),
            })
    }

    /// Authenticated and holding some wallet record for `chain_type`.
    pub fn is_active(&self, chain_type: &str) -> bool {
        self.authenticated && self.wallet_for(chain_type).is_some()
    }
}

/// Everything the resolver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSnapshot {
    pub direct: ConnectionState,
    pub adapter: ConnectionState,
    pub embedded: EmbeddedState,
}

/// The derived, authoritative session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub kind: WalletKind,
    pub address: Option<String>,
    pub public_key: Option<String>,
    pub connected: bool,
}

impl WalletSession {
    pub fn none() -> Self {
        Self {
            kind: WalletKind::None,
            address: None,
            public_key: None,
            connected: false,
        }
    }

    fn from_account(kind: WalletKind, account: &AccountInfo) -> Self {
        Self {
            kind,
            address: Some(account.address.clone()),
            public_key: account.public_key.clone(),
            connected: true,
        }
    }
}

/// Resolve the authoritative session.
///
/// Precedence is fixed: direct > adapter > embedded > none. A direct wallet
/// wins even over an embedded session that was established earlier.
pub fn resolve(snapshot: &BackendSnapshot, chain_type: &str) -> WalletSession {
    if let (true, Some(account)) = (snapshot.direct.connected, &snapshot.direct.account) {
        return WalletSession::from_account(WalletKind::Direct, account);
    }
    if let (true, Some(account)) = (snapshot.adapter.connected, &snapshot.adapter.account) {
        return WalletSession::from_account(WalletKind::Adapter, account);
    }
    if snapshot.embedded.authenticated {
        if let Some(wallet) = snapshot.embedded.wallet_for(chain_type) {
            return WalletSession {
                kind: WalletKind::Embedded,
                address: wallet.address,
                public_key: wallet.public_key,
                connected: true,
            };
        }
    }
    WalletSession::none()
}
