//! Decoding of injected-wallet replies.
//!
//! Newer wallets answer with an envelope (`{"status": "Approved", "args": …}`
//! or `{"status": "Rejected"}`); older ones return the bare value. Replies
//! are decoded here once and the rest of the crate only sees
//! [`SignOutcome`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::wallet::error::{WalletError, WalletResult};

/// Normalized wallet answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome<T> {
    Signed(T),
    Rejected,
}

#[derive(Deserialize)]
enum ReplyStatus {
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReply<T> {
    Envelope {
        status: ReplyStatus,
        args: Option<T>,
    },
    Bare(T),
}

/// Hash returned by a one-shot sign-and-submit: either `{"hash": …}` or a
/// bare string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubmittedHash {
    Object { hash: String },
    Bare(String),
}

impl SubmittedHash {
    pub fn into_hash(self) -> String {
        match self {
            SubmittedHash::Object { hash } | SubmittedHash::Bare(hash) => hash,
        }
    }
}

/// Authenticator returned by `signTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAuthenticator {
    #[serde(default)]
    pub public_key: Option<String>,
    pub signature: String,
}

/// Decode a reply from `backend` into a [`SignOutcome`].
pub fn decode_reply<T: DeserializeOwned>(
    backend: &'static str,
    value: Value,
) -> WalletResult<SignOutcome<T>> {
    let reply: RawReply<T> = serde_json::from_value(value).map_err(|e| WalletError::Backend {
        backend,
        message: format!("unrecognised wallet reply: {}", e),
    })?;
    match reply {
        RawReply::Envelope {
            status: ReplyStatus::Rejected,
            ..
        } => Ok(SignOutcome::Rejected),
        RawReply::Envelope {
            status: ReplyStatus::Approved,
            args: Some(args),
        } => Ok(SignOutcome::Signed(args)),
        RawReply::Envelope {
            status: ReplyStatus::Approved,
            args: None,
        } => Err(WalletError::Backend {
            backend,
            message: "wallet approved without returning a result".to_string(),
        }),
        RawReply::Bare(value) => Ok(SignOutcome::Signed(value)),
    }
}
