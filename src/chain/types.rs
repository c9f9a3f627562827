//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use crate::config::schema::ChainConfig;

/// 32-byte account address.
///
/// Parses the long form (`0x` + 64 hex) and the short form used for
/// framework and module addresses (`0x1`, `0xC`), left-padding with zeros.
/// BCS-encodes as 32 raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AccountAddress([u8; AccountAddress::LENGTH]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Full `0x` + 64 hex form.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountAddress {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(ChainError::InvalidArgument(format!(
                "invalid address '{}': expected 1 to 64 hex digits",
                s
            )));
        }
        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; Self::LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| ChainError::InvalidArgument(format!("invalid address '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self)
    }
}

/// Chain id newtype; BCS-encodes as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChainId(pub u8);

impl From<u8> for ChainId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Network descriptor handed to wallets on connect and on every build.
///
/// Wallet ecosystems only recognise a handful of named networks; ours is
/// always announced as `custom` with an explicit chain id and URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: u8,
    pub url: String,
}

impl NetworkInfo {
    pub fn from_config(config: &ChainConfig) -> Self {
        Self {
            name: config.network_name.clone(),
            chain_id: config.chain_id,
            url: config.rpc_url.clone(),
        }
    }
}

/// Ledger summary returned by the fullnode root endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
    #[serde(default)]
    pub ledger_version: Option<String>,
    #[serde(default)]
    pub ledger_timestamp: Option<String>,
}

/// Where a submitted transaction currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Unknown to the node (not yet propagated, or dropped).
    NotFound,
    /// Accepted into the mempool, not yet executed.
    Pending,
    /// Executed and committed. `success` is false for aborted transactions.
    Committed {
        version: u64,
        success: bool,
        vm_status: String,
    },
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Fullnode answered with a non-success status.
    #[error("fullnode returned {status}: {message}")]
    Http { status: u16, message: String },

    /// Transaction was not settled within the configured deadline.
    #[error("transaction {hash} not settled after {secs} seconds")]
    SettlementTimeout { hash: String, secs: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u8, actual: u8 },

    /// Sender account does not exist on chain.
    #[error("account {0} not found on chain")]
    AccountNotFound(String),

    /// BCS or JSON encoding/decoding failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Malformed function id, type tag, address or argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<bcs::Error> for ChainError {
    fn from(e: bcs::Error) -> Self {
        ChainError::Encoding(e.to_string())
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
