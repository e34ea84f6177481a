//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate instance URLs and endpoint paths
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RouterConfig;
use crate::load_balancer::Instance;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one worker instance must be configured")]
    NoInstances,

    #[error("instance '{0}' is not a valid http(s) URL")]
    InvalidInstanceUrl(String),

    #[error("instance '{0}' is configured more than once")]
    DuplicateInstance(String),

    #[error("{field} must start with '/', got '{value}'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("balancer.algorithm must not be empty")]
    EmptyAlgorithm,
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let balancer = &config.balancer;

    if balancer.instances.is_empty() {
        errors.push(ValidationError::NoInstances);
    }

    let mut seen = HashSet::new();
    for raw in &balancer.instances {
        let valid = Url::parse(raw)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidInstanceUrl(raw.clone()));
        }
        if !seen.insert(Instance::new(raw)) {
            errors.push(ValidationError::DuplicateInstance(raw.clone()));
        }
    }

    for (field, value) in [
        ("balancer.worker_api_path", &balancer.worker_api_path),
        ("balancer.worker_health_path", &balancer.worker_health_path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                field,
                value: value.clone(),
            });
        }
    }

    if balancer.algorithm.trim().is_empty() {
        errors.push(ValidationError::EmptyAlgorithm);
    }

    for (field, value) in [
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(field));
        }
    }

    let mut addresses = vec![("listener.bind_address", &config.listener.bind_address)];
    if config.observability.metrics_enabled {
        addresses.push(("observability.metrics_address", &config.observability.metrics_address));
    }
    for (field, value) in addresses {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
