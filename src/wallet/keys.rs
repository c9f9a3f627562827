//! Address and public-key validation for custodial wallets.
//!
//! Providers hand back Ed25519 public keys in slightly inconsistent shapes:
//! sometimes with a leading zero byte (33 bytes), sometimes with leading
//! zeros stripped. Everything is normalized to exactly 32 bytes of hex.

use thiserror::Error;

use crate::chain::{AccountAddress, Ed25519PublicKey};

const KEY_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("value is empty")]
    Empty,

    #[error("'{0}' is not hex")]
    NotHex(String),

    #[error("expected {expected} hex characters, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("value must be 0x-prefixed")]
    MissingPrefix,
}

fn strip_hex_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Normalize a public key to 64 hex characters (no prefix).
///
/// - 66 characters starting with `00`: keep the trailing 64
/// - fewer than 64: left-pad with zeros
/// - any other length afterwards is an error
pub fn normalize_public_key(input: &str) -> Result<String, KeyError> {
    let digits = strip_hex_prefix(input.trim());
    if digits.is_empty() {
        return Err(KeyError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(KeyError::NotHex(input.to_string()));
    }

    let normalized = if digits.len() == KEY_HEX_LEN + 2 && digits.starts_with("00") {
        digits[2..].to_string()
    } else if digits.len() < KEY_HEX_LEN {
        format!("{:0>width$}", digits, width = KEY_HEX_LEN)
    } else {
        digits.to_string()
    };

    if normalized.len() != KEY_HEX_LEN {
        return Err(KeyError::BadLength {
            expected: KEY_HEX_LEN,
            actual: normalized.len(),
        });
    }
    Ok(normalized)
}

/// Normalize and decode a `0x`-prefixed public key.
pub fn parse_public_key(input: &str) -> Result<Ed25519PublicKey, KeyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty);
    }
    if !trimmed.starts_with("0x") {
        return Err(KeyError::MissingPrefix);
    }
    let normalized = normalize_public_key(trimmed)?;
    Ed25519PublicKey::from_hex(&normalized).map_err(|_| KeyError::NotHex(input.to_string()))
}

/// Strict account address check: `0x` followed by exactly 64 hex characters.
pub fn parse_account_address(input: &str) -> Result<AccountAddress, KeyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty);
    }
    let digits = trimmed.strip_prefix("0x").ok_or(KeyError::MissingPrefix)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(KeyError::NotHex(input.to_string()));
    }
    if digits.len() != KEY_HEX_LEN {
        return Err(KeyError::BadLength {
            expected: KEY_HEX_LEN,
            actual: digits.len(),
        });
    }
    trimmed
        .parse()
        .map_err(|_| KeyError::NotHex(input.to_string()))
}
