//! The slice of fullnode functionality signing needs.

use async_trait::async_trait;

use crate::chain::transaction::SignedTransaction;
use crate::chain::types::{AccountAddress, ChainResult, TransactionStatus};

/// Read/submit access to the chain.
///
/// [`ChainClient`](crate::chain::ChainClient) is the production
/// implementation; tests substitute in-memory ledgers.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Chain id the node reports.
    async fn chain_id(&self) -> ChainResult<u8>;

    /// Next sequence number for `address`.
    async fn sequence_number(&self, address: AccountAddress) -> ChainResult<u64>;

    /// Current gas unit price estimate.
    async fn gas_unit_price(&self) -> ChainResult<u64>;

    /// Submit a signed transaction, returning its hash.
    async fn submit(&self, txn: &SignedTransaction) -> ChainResult<String>;

    /// Look a transaction up by hash.
    async fn transaction_status(&self, hash: &str) -> ChainResult<TransactionStatus>;
}
