//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll delays ordered)
//! - Check URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem with a config value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }

    let chain = &config.chain;
    if chain.network_name.trim().is_empty() {
        errors.push(ValidationError::new("chain.network_name", "must not be empty"));
    }
    for (field, value) in std::iter::once(("chain.rpc_url", &chain.rpc_url))
        .chain(chain.failover_urls.iter().map(|u| ("chain.failover_urls", u)))
        .chain(chain.indexer_url.iter().map(|u| ("chain.indexer_url", u)))
    {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::new(field, format!("'{}' is not a URL", value)));
        }
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.max_gas_amount == 0 {
        errors.push(ValidationError::new("chain.max_gas_amount", "must be > 0"));
    }
    if chain.expiration_secs == 0 {
        errors.push(ValidationError::new("chain.expiration_secs", "must be > 0"));
    }
    if chain.settlement_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.settlement_timeout_secs", "must be > 0"));
    }
    if chain.poll_base_delay_ms == 0 || chain.poll_base_delay_ms > chain.poll_max_delay_ms {
        errors.push(ValidationError::new(
            "chain.poll_base_delay_ms",
            "must be > 0 and not exceed chain.poll_max_delay_ms",
        ));
    }

    for (field, value) in [
        ("contracts.module_address", &config.contracts.module_address),
        ("contracts.registry_address", &config.contracts.registry_address),
        ("contracts.treasury_address", &config.contracts.treasury_address),
    ] {
        if !value.is_empty() && value.parse::<crate::chain::AccountAddress>().is_err() {
            errors.push(ValidationError::new(
                field,
                format!("'{}' is not an account address", value),
            ));
        }
    }

    if url::Url::parse(&config.custodial.api_url).is_err() {
        errors.push(ValidationError::new(
            "custodial.api_url",
            format!("'{}' is not a URL", config.custodial.api_url),
        ));
    }
    if config.custodial.timeout_secs == 0 {
        errors.push(ValidationError::new("custodial.timeout_secs", "must be > 0"));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"pretty\" or \"json\"",
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address when metrics are enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
