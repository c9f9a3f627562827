//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionRequest (function id, args, type args)
//!     → payload.rs (function ids, type tags, BCS argument encoding)
//!     → transaction.rs (raw transaction, signing message, authenticator)
//!     → client.rs (submit BCS, poll by hash, failover across fullnodes)
//! ```
//!
//! # Constraints
//! - The chain is Aptos-compatible but not a named network; every build
//!   carries the configured chain id
//! - All RPC calls have configurable timeouts
//! - Settlement waits are bounded by `chain.settlement_timeout_secs`

pub mod client;
pub mod ledger;
pub mod payload;
pub mod transaction;
pub mod types;

pub use client::ChainClient;
pub use ledger::Ledger;
pub use payload::{EntryFunction, FunctionId, MoveValue, TypeTag};
pub use transaction::{
    Ed25519PublicKey, Ed25519Signature, RawTransaction, Settlement, SignedTransaction,
    TransactionAuthenticator, TxBuilder,
};
pub use types::{
    AccountAddress, ChainConfig, ChainError, ChainId, ChainResult, NetworkInfo, TransactionStatus,
};
