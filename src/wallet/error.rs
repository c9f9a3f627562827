//! Wallet error taxonomy.
//!
//! Raw backend failures arrive as [`BackendError`] (an opaque message from a
//! wallet library or provider). Each adapter classifies them exactly once,
//! at its boundary, into a [`WalletError`] variant. Everything above the
//! adapters, including the fallback table, only matches on variants.

use thiserror::Error;

use crate::chain::ChainError;

/// Opaque failure reported by an external wallet backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the signing layer.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No backend resolved to an active session.
    #[error("No wallet connected. Connect a browser wallet or sign in with email to continue.")]
    NotConnected,

    /// The adapter library refused the custom network.
    #[error("Wallet adapter does not support this network: {0}")]
    UnsupportedNetwork(String),

    /// Unsupported network and no embedded session to fall back to.
    #[error(
        "Your wallet cannot sign for the {network} network ({reason}). \
         Either add the {network} network in your browser wallet's settings, \
         or sign in with email to use the embedded wallet instead."
    )]
    NetworkFallbackUnavailable { network: String, reason: String },

    /// Embedded wallet exists but its public key was never exposed.
    #[error(
        "Embedded wallet {address} has no public key. \
         Disconnect and sign in again to finish setting up your wallet."
    )]
    MissingKeyMaterial { address: String },

    /// Address or public key present but malformed.
    #[error("Embedded wallet key material is malformed: {0}")]
    InvalidKeyMaterial(String),

    /// Signed in, but wallet creation has not produced an address yet.
    #[error("Your embedded wallet is still being created. Wait a moment, then try again or sign in again.")]
    EmbeddedWalletPending,

    /// The holder declined to sign.
    #[error("Transaction was rejected in the wallet")]
    UserRejected,

    /// A signature came back that does not verify for the signing message.
    #[error("Signature from {0} does not verify for this transaction")]
    InvalidSignature(String),

    /// Build, submission or settlement failed on chain.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Any other backend failure, message preserved.
    #[error("{backend} wallet error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

/// Coarse class of a [`WalletError`], used to key fallback rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    NotConnected,
    UnsupportedNetwork,
    KeyMaterial,
    UserRejected,
    Chain,
    Other,
}

impl WalletError {
    pub fn class(&self) -> ErrorClass {
        match self {
            WalletError::NotConnected => ErrorClass::NotConnected,
            WalletError::UnsupportedNetwork(_) | WalletError::NetworkFallbackUnavailable { .. } => {
                ErrorClass::UnsupportedNetwork
            }
            WalletError::MissingKeyMaterial { .. }
            | WalletError::InvalidKeyMaterial(_)
            | WalletError::EmbeddedWalletPending => ErrorClass::KeyMaterial,
            WalletError::UserRejected => ErrorClass::UserRejected,
            WalletError::Chain(_) => ErrorClass::Chain,
            WalletError::InvalidSignature(_) | WalletError::Backend { .. } => ErrorClass::Other,
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self.class() {
            ErrorClass::NotConnected => "not_connected",
            ErrorClass::UnsupportedNetwork => "unsupported_network",
            ErrorClass::KeyMaterial => "key_material",
            ErrorClass::UserRejected => "rejected",
            ErrorClass::Chain => "chain_error",
            ErrorClass::Other => "error",
        }
    }
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Message fragments wallet libraries use when refusing a network.
const UNSUPPORTED_NETWORK_PATTERNS: &[&str] = &[
    "invalid network",
    "unsupported network",
    "network not supported",
    "not supported network",
    "network mismatch",
    "unknown network",
];

/// Message fragments wallets use when the holder declines.
const USER_REJECTION_PATTERNS: &[&str] = &[
    "user rejected",
    "user denied",
    "rejected by user",
    "user cancelled",
    "user canceled",
    "request rejected",
];

/// Classify a raw backend failure. Called once per failure, at the adapter
/// boundary that received it.
pub fn classify(backend: &'static str, err: BackendError) -> WalletError {
    let lowered = err.message.to_lowercase();
    if USER_REJECTION_PATTERNS.iter().any(|p| lowered.contains(p)) {
        WalletError::UserRejected
    } else if UNSUPPORTED_NETWORK_PATTERNS.iter().any(|p| lowered.contains(p)) {
        WalletError::UnsupportedNetwork(err.message)
    } else {
        WalletError::Backend {
            backend,
            message: err.message,
        }
    }
}
