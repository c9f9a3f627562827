//! Time Dollar entry-function builders.
//!
//! Each UI mutation maps to one entry function on the published Time Dollar
//! modules. The builders here only assemble [`TransactionRequest`]s; signing
//! goes through [`UnifiedWallet`](crate::wallet::UnifiedWallet).
//!
//! # Modules
//! - `members`: membership requests and approvals
//! - `time_token`: logging volunteer hours
//! - `treasury`: deposits and withdrawals of the configured coin
//! - `projects`: crowdfunding
//! - `governance`: proposals and votes

use crate::chain::{AccountAddress, ChainError, ChainResult, FunctionId, MoveValue, TypeTag};
use crate::config::ContractsConfig;
use crate::wallet::TransactionRequest;

/// Member roles understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MemberRole {
    Member = 0,
    Organizer = 1,
}

/// Resolved contract addresses and coin type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBank {
    module_address: AccountAddress,
    registry: AccountAddress,
    treasury: AccountAddress,
    coin_type: TypeTag,
}

fn parse_address(field: &str, value: &str) -> ChainResult<AccountAddress> {
    value
        .parse()
        .map_err(|e| ChainError::InvalidArgument(format!("contracts.{}: {}", field, e)))
}

impl TimeBank {
    pub fn from_config(config: &ContractsConfig) -> ChainResult<Self> {
        let module_address = parse_address("module_address", &config.module_address)?;
        let registry = if config.registry_address.is_empty() {
            module_address
        } else {
            parse_address("registry_address", &config.registry_address)?
        };
        let treasury = if config.treasury_address.is_empty() {
            module_address
        } else {
            parse_address("treasury_address", &config.treasury_address)?
        };
        let coin_type = if config.coin_type.is_empty() {
            "0x1::aptos_coin::AptosCoin".parse()?
        } else {
            config.coin_type.parse()?
        };
        Ok(Self {
            module_address,
            registry,
            treasury,
            coin_type,
        })
    }

    fn call(&self, module: &str, function: &str, args: Vec<MoveValue>) -> TransactionRequest {
        TransactionRequest::new(FunctionId::new(self.module_address, module, function), args)
    }

    pub fn request_membership(&self, role: MemberRole, note: &str) -> TransactionRequest {
        self.call(
            "members",
            "request_membership",
            vec![
                MoveValue::Address(self.registry),
                MoveValue::U8(role as u8),
                MoveValue::Bytes(note.as_bytes().to_vec()),
            ],
        )
    }

    pub fn approve_member(&self, applicant: AccountAddress) -> TransactionRequest {
        self.call(
            "members",
            "approve_member",
            vec![MoveValue::Address(self.registry), MoveValue::Address(applicant)],
        )
    }

    /// Log volunteer time; one Time Dollar per hour is minted on approval.
    pub fn log_hours(&self, minutes: u64, description: &str) -> TransactionRequest {
        self.call(
            "time_token",
            "log_hours",
            vec![
                MoveValue::Address(self.registry),
                MoveValue::U64(minutes),
                MoveValue::String(description.to_string()),
            ],
        )
    }

    pub fn treasury_deposit(&self, amount: u64) -> TransactionRequest {
        self.call(
            "treasury",
            "deposit",
            vec![MoveValue::Address(self.treasury), MoveValue::U64(amount)],
        )
        .with_type_arguments(vec![self.coin_type.clone()])
    }

    pub fn treasury_withdraw(&self, amount: u64, reason: &str) -> TransactionRequest {
        self.call(
            "treasury",
            "withdraw",
            vec![
                MoveValue::Address(self.treasury),
                MoveValue::U64(amount),
                MoveValue::String(reason.to_string()),
            ],
        )
        .with_type_arguments(vec![self.coin_type.clone()])
    }

    pub fn fund_project(&self, project_id: u64, amount: u64) -> TransactionRequest {
        self.call(
            "projects",
            "fund_project",
            vec![MoveValue::U64(project_id), MoveValue::U64(amount)],
        )
        .with_type_arguments(vec![self.coin_type.clone()])
    }

    pub fn create_proposal(
        &self,
        title: &str,
        description: &str,
        voting_period_secs: u64,
    ) -> TransactionRequest {
        self.call(
            "governance",
            "create_proposal",
            vec![
                MoveValue::Address(self.registry),
                MoveValue::String(title.to_string()),
                MoveValue::String(description.to_string()),
                MoveValue::U64(voting_period_secs),
            ],
        )
    }

    pub fn vote(&self, proposal_id: u64, support: bool) -> TransactionRequest {
        self.call(
            "governance",
            "vote",
            vec![MoveValue::U64(proposal_id), MoveValue::Bool(support)],
        )
    }

    pub fn module_address(&self) -> AccountAddress {
        self.module_address
    }
}
