//! Custodial wallet provider integration.
//!
//! # Data Flow
//! ```text
//! key service / CLI
//!     → client.rs (app-authenticated REST: wallet lookup, raw_sign)
//!     → wallet.rs (session for one wallet id, implements CustodialWallet)
//!     → wallet::EmbeddedSigner
//! ```

pub mod client;
pub mod wallet;

pub use client::{CustodialError, CustodialResult, ProviderClient, ProviderWallet};
pub use wallet::HttpCustodialWallet;
