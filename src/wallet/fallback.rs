//! Fallback policy between wallet backends.
//!
//! Rules are keyed by the failing backend and the error class it produced.
//! Anything without a rule propagates unchanged.

use crate::wallet::error::{ErrorClass, WalletError};
use crate::wallet::session::WalletKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRule {
    pub from: WalletKind,
    pub on: ErrorClass,
    pub to: WalletKind,
}

/// The adapter refusing our network is the only recoverable failure: the
/// embedded wallet signs locally-built transactions and never validates
/// network names.
pub const FALLBACK_RULES: &[FallbackRule] = &[FallbackRule {
    from: WalletKind::Adapter,
    on: ErrorClass::UnsupportedNetwork,
    to: WalletKind::Embedded,
}];

/// Backend to retry on after `from` failed with `error`, if any rule applies.
pub fn fallback_for(from: WalletKind, error: &WalletError) -> Option<WalletKind> {
    let class = error.class();
    FALLBACK_RULES
        .iter()
        .find(|rule| rule.from == from && rule.on == class)
        .map(|rule| rule.to)
}
