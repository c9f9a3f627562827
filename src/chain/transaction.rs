//! Transaction building, signing messages and settlement monitoring.
//!
//! # Responsibilities
//! - Build raw transactions (sequence number, gas price, expiry, chain id)
//! - Produce the signing message wallets and the custodial provider sign
//! - Wrap Ed25519 signatures into authenticators and signed transactions
//! - Poll until a submitted transaction settles, under a deadline

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::{sleep, timeout};

use crate::chain::ledger::Ledger;
use crate::chain::payload::{EntryFunction, TransactionPayload};
use crate::chain::types::{
    AccountAddress, ChainConfig, ChainError, ChainId, ChainResult, TransactionStatus,
};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";
const TRANSACTION_SALT: &[u8] = b"APTOS::Transaction";

fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// Unsigned transaction, field order fixed by the chain's BCS layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: ChainId,
}

impl RawTransaction {
    pub fn to_bcs(&self) -> ChainResult<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Bytes an Ed25519 key signs: `sha3_256(salt) || bcs(raw)`.
    pub fn signing_message(&self) -> ChainResult<Vec<u8>> {
        let mut message = sha3_256(RAW_TRANSACTION_SALT).to_vec();
        message.extend_from_slice(&self.to_bcs()?);
        Ok(message)
    }
}

/// 32-byte Ed25519 public key, BCS-encoded as a length-prefixed byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// 64-byte Ed25519 signature, BCS-encoded as a length-prefixed byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

fn decode_fixed<const N: usize>(input: &str, what: &str) -> ChainResult<[u8; N]> {
    let digits = input.trim().strip_prefix("0x").unwrap_or(input.trim());
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|e| {
        ChainError::InvalidArgument(format!("{} must be {} hex-encoded bytes: {}", what, N, e))
    })?;
    Ok(out)
}

impl Ed25519PublicKey {
    pub fn from_hex(input: &str) -> ChainResult<Self> {
        decode_fixed::<32>(input, "public key").map(Self)
    }

    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl Ed25519Signature {
    pub fn from_hex(input: &str) -> ChainResult<Self> {
        decode_fixed::<64>(input, "signature").map(Self)
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

/// Transaction authenticator. Only single-key Ed25519 is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionAuthenticator {
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    },
}

impl TransactionAuthenticator {
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        TransactionAuthenticator::Ed25519 {
            public_key,
            signature,
        }
    }

    /// Check the signature against `message` locally.
    pub fn verify(&self, message: &[u8]) -> bool {
        let TransactionAuthenticator::Ed25519 {
            public_key,
            signature,
        } = self;
        let Ok(key) = VerifyingKey::from_bytes(&public_key.0) else {
            return false;
        };
        key.verify(message, &Signature::from_bytes(&signature.0)).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    pub fn new(raw_txn: RawTransaction, authenticator: TransactionAuthenticator) -> Self {
        Self {
            raw_txn,
            authenticator,
        }
    }

    pub fn to_bcs(&self) -> ChainResult<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Hash the chain assigns once committed, as `0x` + 64 hex.
    pub fn committed_hash(&self) -> ChainResult<String> {
        let mut preimage = sha3_256(TRANSACTION_SALT).to_vec();
        // Transaction::UserTransaction discriminant.
        preimage.push(0);
        preimage.extend_from_slice(&self.to_bcs()?);
        Ok(format!("0x{}", hex::encode(sha3_256(&preimage))))
    }
}

/// Final state of a settled transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub hash: String,
    pub version: u64,
    pub success: bool,
    pub vm_status: String,
}

/// Builds raw transactions for a sender against the configured chain.
#[derive(Clone)]
pub struct TxBuilder {
    ledger: Arc<dyn Ledger>,
    config: ChainConfig,
}

impl TxBuilder {
    pub fn new(ledger: Arc<dyn Ledger>, config: ChainConfig) -> Self {
        Self { ledger, config }
    }

    /// Build an unsigned transaction calling `entry` as `sender`.
    pub async fn build(
        &self,
        sender: AccountAddress,
        entry: EntryFunction,
    ) -> ChainResult<RawTransaction> {
        let sequence_number = self.ledger.sequence_number(sender).await?;
        let gas_unit_price = match self.config.gas_unit_price {
            Some(price) => price,
            None => self.ledger.gas_unit_price().await?,
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        tracing::debug!(
            sender = %sender,
            sequence_number,
            gas_unit_price,
            function = %entry.function,
            "Built raw transaction"
        );

        Ok(RawTransaction {
            sender,
            sequence_number,
            payload: TransactionPayload::EntryFunction(entry),
            max_gas_amount: self.config.max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs: now + self.config.expiration_secs,
            chain_id: ChainId(self.config.chain_id),
        })
    }

    /// Wait for `hash` to settle using the configured deadline and poll delays.
    pub async fn wait_for_settlement(&self, hash: &str) -> ChainResult<Settlement> {
        wait_for_settlement(
            self.ledger.as_ref(),
            hash,
            Duration::from_secs(self.config.settlement_timeout_secs),
            self.config.poll_base_delay_ms,
            self.config.poll_max_delay_ms,
        )
        .await
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

/// Poll `hash` until committed or `deadline` passes.
///
/// Transient RPC failures are logged and polled through; any other error
/// ends the wait.
pub async fn wait_for_settlement(
    ledger: &dyn Ledger,
    hash: &str,
    deadline: Duration,
    base_delay_ms: u64,
    max_delay_ms: u64,
) -> ChainResult<Settlement> {
    let started = Instant::now();

    let result = timeout(deadline, async {
        let mut attempt = 0u32;
        loop {
            match ledger.transaction_status(hash).await {
                Ok(TransactionStatus::Committed {
                    version,
                    success,
                    vm_status,
                }) => {
                    return Ok(Settlement {
                        hash: hash.to_string(),
                        version,
                        success,
                        vm_status,
                    });
                }
                Ok(status) => {
                    tracing::debug!(tx_hash = %hash, ?status, "Transaction not settled yet");
                }
                Err(e @ (ChainError::Rpc(_) | ChainError::Timeout(_))) => {
                    tracing::warn!(tx_hash = %hash, error = %e, "Settlement poll failed, retrying");
                }
                Err(e) => return Err(e),
            }
            attempt = attempt.saturating_add(1);
            sleep(calculate_backoff(attempt, base_delay_ms, max_delay_ms)).await;
        }
    })
    .await;

    match result {
        Ok(settled) => {
            if let Ok(settlement) = &settled {
                metrics::record_settlement(settlement.success, started);
            }
            settled
        }
        Err(_) => Err(ChainError::SettlementTimeout {
            hash: hash.to_string(),
            secs: deadline.as_secs(),
        }),
    }
}
