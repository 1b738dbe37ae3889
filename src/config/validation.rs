//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities within a blob)
//! - Parse addresses, URLs and namespaces once so startup fails early
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SubmitterConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use alloy::primitives::Address;

use crate::blob::MAX_BLOB_CAPACITY;
use crate::config::schema::SubmitterConfig;
use crate::observability::logging::LOG_FORMATS;
use crate::submission::envelope::Namespace;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MIN_EXECUTION_GAS: u64 = 21_000;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every section and collect all issues.
pub fn validate_config(config: &SubmitterConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.as_str()) {
        issues.push(ConfigIssue::new(
            "observability.log_level",
            format!("unknown level '{}'", obs.log_level),
        ));
    }
    if !LOG_FORMATS.contains(&obs.log_format.as_str()) {
        issues.push(ConfigIssue::new(
            "observability.log_format",
            format!("unknown format '{}'", obs.log_format),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if config.poller.interval_ms == 0 {
        issues.push(ConfigIssue::new("poller.interval_ms", "must be greater than 0"));
    }
    if config.poller.deadline_secs == 0 {
        issues.push(ConfigIssue::new("poller.deadline_secs", "must be greater than 0"));
    }

    let chain = &config.blockchain;
    if chain.enabled {
        if let Err(e) = chain.rpc_url.parse::<url::Url>() {
            issues.push(ConfigIssue::new(
                "blockchain.rpc_url",
                format!("invalid URL '{}': {}", chain.rpc_url, e),
            ));
        }
        for failover in &chain.failover_urls {
            if failover.parse::<url::Url>().is_err() {
                issues.push(ConfigIssue::new(
                    "blockchain.failover_urls",
                    format!("invalid URL '{}'", failover),
                ));
            }
        }
        if chain.rpc_timeout_secs == 0 {
            issues.push(ConfigIssue::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
        }
        if !(chain.fee_multiplier.is_finite() && chain.fee_multiplier >= 1.0) {
            issues.push(ConfigIssue::new("blockchain.fee_multiplier", "must be at least 1.0"));
        }
        if chain.gas_limit < MIN_EXECUTION_GAS {
            issues.push(ConfigIssue::new(
                "blockchain.gas_limit",
                format!("must be at least {}", MIN_EXECUTION_GAS),
            ));
        }
        if chain.recipient.parse::<Address>().is_err() {
            issues.push(ConfigIssue::new(
                "blockchain.recipient",
                format!("'{}' is not an address", chain.recipient),
            ));
        }
        if chain.blob_capacity == 0 || chain.blob_capacity > MAX_BLOB_CAPACITY {
            issues.push(ConfigIssue::new(
                "blockchain.blob_capacity",
                format!("must be between 1 and {}", MAX_BLOB_CAPACITY),
            ));
        }
        if chain.private_key_env.trim().is_empty() {
            issues.push(ConfigIssue::new("blockchain.private_key_env", "must name a variable"));
        }
    }

    if config.namespace.enabled {
        if let Err(e) = Namespace::from_hex(&config.namespace.namespace) {
            issues.push(ConfigIssue::new("namespace.namespace", e.to_string()));
        }
        if config.namespace.max_blob_size == 0 {
            issues.push(ConfigIssue::new("namespace.max_blob_size", "must be greater than 0"));
        }
    }

    if config.dispersal.enabled {
        let unique: HashSet<_> = config.dispersal.quorums.iter().collect();
        if unique.len() != config.dispersal.quorums.len() {
            issues.push(ConfigIssue::new("dispersal.quorums", "contains duplicates"));
        }
        if config.dispersal.max_blob_size == 0 {
            issues.push(ConfigIssue::new("dispersal.max_blob_size", "must be greater than 0"));
        }
    }

    if config.app_data.enabled && config.app_data.max_blob_size == 0 {
        issues.push(ConfigIssue::new("app_data.max_blob_size", "must be greater than 0"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SubmitterConfig::default()).is_ok());
    }

    #[test]
    fn test_log_formats() {
        let mut config = SubmitterConfig::default();
        for format in ["pretty", "compact", "json"] {
            config.observability.log_format = format.to_string();
            assert!(validate_config(&config).is_ok(), "{format} should be accepted");
        }

        config.observability.log_format = "xml".to_string();
        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues[0].field, "observability.log_format");
    }

    #[test]
    fn test_collects_all_issues() {
        let mut config = SubmitterConfig::default();
        config.poller.interval_ms = 0;
        config.blockchain.enabled = true;
        config.blockchain.rpc_url = "not a url".to_string();
        config.blockchain.blob_capacity = MAX_BLOB_CAPACITY + 1;
        config.blockchain.recipient = "0x1234".to_string();

        let issues = validate_config(&config).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert!(fields.contains(&"poller.interval_ms"));
        assert!(fields.contains(&"blockchain.rpc_url"));
        assert!(fields.contains(&"blockchain.blob_capacity"));
        assert!(fields.contains(&"blockchain.recipient"));
    }

    #[test]
    fn test_disabled_sections_are_not_checked() {
        let mut config = SubmitterConfig::default();
        config.namespace.namespace = "zz".to_string();
        assert!(validate_config(&config).is_ok());

        config.namespace.enabled = true;
        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues[0].field, "namespace.namespace");
    }

    #[test]
    fn test_duplicate_quorums() {
        let mut config = SubmitterConfig::default();
        config.dispersal.enabled = true;
        config.dispersal.quorums = vec![0, 1, 1];
        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().contains("duplicates"));
    }
}
