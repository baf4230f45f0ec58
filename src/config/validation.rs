//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject an empty or malformed backend list
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::backend::parse_backend_url;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("invalid backend url `{url}`: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("proxy.port is not a valid port: `{0}`")]
    InvalidProxyPort(String),

    #[error("listener port must not be 0")]
    ZeroPort,

    #[error("{field} must be greater than 0")]
    ZeroDuration { field: &'static str },

    #[error("health_check.timeout_secs ({timeout_secs}) must be shorter than health_check.interval_secs ({interval_secs})")]
    ProbeTimeoutTooLong { timeout_secs: u64, interval_secs: u64 },

    #[error("limits.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("{field} is not a valid socket address: `{value}`")]
    InvalidSocketAddr { field: &'static str, value: String },
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for backend in &config.backends {
        if let Err(e) = parse_backend_url(&backend.url) {
            errors.push(e);
        }
    }

    let health = &config.health_check;
    if health.enabled {
        if health.interval_secs == 0 {
            errors.push(ValidationError::ZeroDuration { field: "health_check.interval_secs" });
        }
        if health.timeout_secs == 0 {
            errors.push(ValidationError::ZeroDuration { field: "health_check.timeout_secs" });
        } else if health.interval_secs > 0 && health.timeout_secs >= health.interval_secs {
            errors.push(ValidationError::ProbeTimeoutTooLong {
                timeout_secs: health.timeout_secs,
                interval_secs: health.interval_secs,
            });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroDuration { field: "timeouts.connect_secs" });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroDuration { field: "timeouts.upstream_secs" });
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidSocketAddr {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddr {
            field: "admin.bind_address",
            value: config.admin.bind_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
