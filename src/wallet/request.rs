//! Transaction requests and results exchanged with the signing layer.

use serde::Serialize;
use serde_json::{json, Value};

use crate::chain::{ChainResult, EntryFunction, FunctionId, MoveValue, TypeTag};
use crate::wallet::session::WalletKind;

/// An entry-function call to be signed and submitted.
///
/// Immutable once built; adapters only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    function: FunctionId,
    arguments: Vec<MoveValue>,
    type_arguments: Vec<TypeTag>,
}

impl TransactionRequest {
    pub fn new(function: FunctionId, arguments: Vec<MoveValue>) -> Self {
        Self {
            function,
            arguments,
            type_arguments: Vec::new(),
        }
    }

    /// Parse a `address::module::function` id.
    pub fn parse(function: &str, arguments: Vec<MoveValue>) -> ChainResult<Self> {
        Ok(Self::new(function.parse()?, arguments))
    }

    pub fn with_type_arguments(mut self, type_arguments: Vec<TypeTag>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    pub fn function(&self) -> &FunctionId {
        &self.function
    }

    pub fn arguments(&self) -> &[MoveValue] {
        &self.arguments
    }

    pub fn type_arguments(&self) -> &[TypeTag] {
        &self.type_arguments
    }

    /// BCS entry function for local transaction building.
    pub fn entry_function(&self) -> ChainResult<EntryFunction> {
        EntryFunction::new(&self.function, self.type_arguments.clone(), &self.arguments)
    }

    /// JSON payload for wallets that build the transaction themselves.
    pub fn to_wallet_payload(&self) -> Value {
        json!({
            "function": self.function.to_string(),
            "typeArguments": self.type_arguments.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "functionArguments": self.arguments.iter().map(MoveValue::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Outcome of one submitted request. Handed to the caller, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    pub hash: String,
    /// True once accepted; for settled transactions, whether execution succeeded.
    pub success: bool,
    /// VM status when the transaction was waited on.
    pub vm_status: Option<String>,
    /// Backend that produced the hash.
    pub wallet: WalletKind,
}

impl TransactionResult {
    pub fn submitted(hash: String, wallet: WalletKind) -> Self {
        Self {
            hash,
            success: true,
            vm_status: None,
            wallet,
        }
    }
}
