//! Unified multi-wallet transaction signing for the Time Dollar dApp.

pub mod chain;
pub mod config;
pub mod custodial;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod timebank;
pub mod wallet;

pub use config::AppConfig;
pub use http::KeyServer;
pub use lifecycle::Shutdown;
pub use wallet::{TransactionRequest, TransactionResult, UnifiedWallet, WalletError, WalletKind};
