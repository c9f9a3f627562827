//! Entry-function payloads: function ids, type tags and argument values.
//!
//! Everything here BCS-encodes exactly the way the Move VM expects, and also
//! renders a JSON view for wallets that take the payload in JSON form.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::chain::types::{AccountAddress, ChainError, ChainResult};

fn check_identifier(ident: &str, what: &str, input: &str) -> ChainResult<()> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ChainError::InvalidArgument(format!(
            "invalid {} '{}' in '{}'",
            what, ident, input
        )))
    }
}

/// `address::module::function`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionId {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
}

impl FunctionId {
    pub fn new(address: AccountAddress, module: &str, name: &str) -> Self {
        Self {
            address,
            module: module.to_string(),
            name: name.to_string(),
        }
    }
}

impl FromStr for FunctionId {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [address, module, name] = parts.as_slice() else {
            return Err(ChainError::InvalidArgument(format!(
                "function id '{}' must look like address::module::function",
                s
            )));
        };
        check_identifier(module, "module name", s)?;
        check_identifier(name, "function name", s)?;
        Ok(Self {
            address: address.parse()?,
            module: module.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)
    }
}

/// Move type tag. Variant order matches the on-chain BCS discriminants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
    pub type_args: Vec<TypeTag>,
}

/// Split on commas that are not nested inside `<...>`.
fn split_top_level(s: &str) -> ChainResult<Vec<&str>> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        if depth < 0 {
            return Err(ChainError::InvalidArgument(format!("unbalanced '>' in '{}'", s)));
        }
    }
    if depth != 0 {
        return Err(ChainError::InvalidArgument(format!("unbalanced '<' in '{}'", s)));
    }
    parts.push(s[start..].trim());
    Ok(parts)
}

impl FromStr for TypeTag {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let tag = match s {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            _ => {
                if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
                    return Ok(TypeTag::Vector(Box::new(inner.parse()?)));
                }
                let (base, type_args) = match s.find('<') {
                    Some(open) => {
                        let inner = s[open + 1..].strip_suffix('>').ok_or_else(|| {
                            ChainError::InvalidArgument(format!("unterminated generics in '{}'", s))
                        })?;
                        let args = split_top_level(inner)?
                            .into_iter()
                            .map(str::parse)
                            .collect::<ChainResult<Vec<TypeTag>>>()?;
                        (&s[..open], args)
                    }
                    None => (s, Vec::new()),
                };
                let parts: Vec<&str> = base.split("::").collect();
                let [address, module, name] = parts.as_slice() else {
                    return Err(ChainError::InvalidArgument(format!("unknown type tag '{}'", s)));
                };
                check_identifier(module, "module name", s)?;
                check_identifier(name, "struct name", s)?;
                TypeTag::Struct(Box::new(StructTag {
                    address: address.parse()?,
                    module: module.to_string(),
                    name: name.to_string(),
                    type_args,
                }))
            }
        };
        Ok(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => {
                write!(f, "{}::{}::{}", tag.address, tag.module, tag.name)?;
                if !tag.type_args.is_empty() {
                    let args: Vec<String> = tag.type_args.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// A typed entry-function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    /// `vector<u8>`
    Bytes(Vec<u8>),
    /// `0x1::string::String`
    String(String),
}

impl MoveValue {
    /// BCS bytes as placed in the entry-function `args` vector.
    pub fn to_bcs(&self) -> ChainResult<Vec<u8>> {
        let bytes = match self {
            MoveValue::Bool(v) => bcs::to_bytes(v)?,
            MoveValue::U8(v) => bcs::to_bytes(v)?,
            MoveValue::U16(v) => bcs::to_bytes(v)?,
            MoveValue::U32(v) => bcs::to_bytes(v)?,
            MoveValue::U64(v) => bcs::to_bytes(v)?,
            MoveValue::U128(v) => bcs::to_bytes(v)?,
            MoveValue::Address(v) => bcs::to_bytes(v)?,
            MoveValue::Bytes(v) => bcs::to_bytes(v)?,
            MoveValue::String(v) => bcs::to_bytes(v)?,
        };
        Ok(bytes)
    }

    /// JSON form used by wallet payloads: 64/128-bit integers as strings,
    /// byte vectors as `0x` hex.
    pub fn to_json(&self) -> Value {
        match self {
            MoveValue::Bool(v) => json!(v),
            MoveValue::U8(v) => json!(v),
            MoveValue::U16(v) => json!(v),
            MoveValue::U32(v) => json!(v),
            MoveValue::U64(v) => json!(v.to_string()),
            MoveValue::U128(v) => json!(v.to_string()),
            MoveValue::Address(v) => json!(v.to_string()),
            MoveValue::Bytes(v) => json!(format!("0x{}", hex::encode(v))),
            MoveValue::String(v) => json!(v),
        }
    }
}

impl From<bool> for MoveValue {
    fn from(v: bool) -> Self {
        MoveValue::Bool(v)
    }
}

impl From<u8> for MoveValue {
    fn from(v: u8) -> Self {
        MoveValue::U8(v)
    }
}

impl From<u64> for MoveValue {
    fn from(v: u64) -> Self {
        MoveValue::U64(v)
    }
}

impl From<AccountAddress> for MoveValue {
    fn from(v: AccountAddress) -> Self {
        MoveValue::Address(v)
    }
}

impl From<Vec<u8>> for MoveValue {
    fn from(v: Vec<u8>) -> Self {
        MoveValue::Bytes(v)
    }
}

/// Parses `kind:value`, e.g. `u64:10`, `address:0x1`, `bytes:0xdead`,
/// `string:hello`.
impl FromStr for MoveValue {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, raw) = s.split_once(':').ok_or_else(|| {
            ChainError::InvalidArgument(format!("argument '{}' must look like kind:value", s))
        })?;
        let bad = |e: &dyn fmt::Display| {
            ChainError::InvalidArgument(format!("invalid {} argument '{}': {}", kind, raw, e))
        };
        let value = match kind {
            "bool" => MoveValue::Bool(raw.parse().map_err(|e| bad(&e))?),
            "u8" => MoveValue::U8(raw.parse().map_err(|e| bad(&e))?),
            "u16" => MoveValue::U16(raw.parse().map_err(|e| bad(&e))?),
            "u32" => MoveValue::U32(raw.parse().map_err(|e| bad(&e))?),
            "u64" => MoveValue::U64(raw.parse().map_err(|e| bad(&e))?),
            "u128" => MoveValue::U128(raw.parse().map_err(|e| bad(&e))?),
            "address" => MoveValue::Address(raw.parse()?),
            "bytes" | "hex" => {
                MoveValue::Bytes(hex::decode(raw.strip_prefix("0x").unwrap_or(raw)).map_err(|e| bad(&e))?)
            }
            "string" => MoveValue::String(raw.to_string()),
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown argument kind '{}'",
                    other
                )))
            }
        };
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: String,
}

/// Entry-function call with pre-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFunction {
    pub module: ModuleId,
    pub function: String,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    pub fn new(function: &FunctionId, ty_args: Vec<TypeTag>, args: &[MoveValue]) -> ChainResult<Self> {
        Ok(Self {
            module: ModuleId {
                address: function.address,
                name: function.module.clone(),
            },
            function: function.name.clone(),
            ty_args,
            args: args.iter().map(MoveValue::to_bcs).collect::<ChainResult<_>>()?,
        })
    }
}

/// Transaction payload. Only entry functions are ever built here, but the
/// discriminant must match the chain's enum where it sits at index 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    EntryFunction(EntryFunction),
}

impl Serialize for TransactionPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TransactionPayload::EntryFunction(ef) => {
                serializer.serialize_newtype_variant("TransactionPayload", 2, "EntryFunction", ef)
            }
        }
    }
}
