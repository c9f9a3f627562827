//! Multi-wallet signing layer.
//!
//! # Responsibilities
//! - Resolve one authoritative session from three independent backends
//! - Sign and submit entry-function calls through the resolved backend
//! - Classify backend failures once into [`WalletError`]
//! - Recover from adapter network rejections via the embedded wallet
//!
//! # Design Decisions
//! - Each backend sits behind an async trait so the façade never sees
//!   browser or provider specifics
//! - The session is derived on demand, never stored
//! - Fallback rules live in a table, not in nested error handling

pub mod adapter;
pub mod direct;
pub mod embedded;
pub mod error;
pub mod facade;
pub mod fallback;
pub mod keys;
pub mod reply;
pub mod request;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use adapter::{AdapterSigner, WalletAdapter};
pub use direct::{DirectSigner, StandardWallet, WalletFeatures};
pub use embedded::{CustodialWallet, EmbeddedSigner};
pub use error::{BackendError, ErrorClass, WalletError, WalletResult};
pub use facade::{UnifiedWallet, UnifiedWalletBuilder};
pub use keys::{normalize_public_key, KeyError};
pub use request::{TransactionRequest, TransactionResult};
pub use session::{
    resolve, AccountInfo, BackendSnapshot, ConnectionState, EmbeddedState, EmbeddedWalletRecord,
    LinkedAccount, WalletKind, WalletSession,
};

/// Contract shared by the per-backend signers.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn kind(&self) -> WalletKind;

    /// Sign `request` and submit it, failing with a typed error on any
    /// problem.
    async fn sign_and_submit(&self, request: &TransactionRequest) -> WalletResult<TransactionResult>;
}
