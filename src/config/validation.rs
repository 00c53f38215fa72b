//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows, timeouts, sizes all non-zero)
//! - Check addresses parse before anything binds to them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs once at startup, before the config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic violation in the configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    InvalidLogLevel(String),
    BlankAllowedOrigin,
    ZeroRateLimitWindow,
    ZeroRateLimitMax,
    ZeroRelayTimeout,
    ZeroConnectTimeout,
    ZeroMaxBodyBytes,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a socket address: {addr:?}")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address is not a socket address: {addr:?}")
            }
            ValidationError::InvalidLogLevel(level) => {
                write!(f, "observability.log_level must be one of {LOG_LEVELS:?}, got {level:?}")
            }
            ValidationError::BlankAllowedOrigin => {
                write!(f, "cors.allowed_origins contains a blank entry")
            }
            ValidationError::ZeroRateLimitWindow => {
                write!(f, "rate_limit.window_secs must be greater than zero")
            }
            ValidationError::ZeroRateLimitMax => {
                write!(f, "rate_limit.max_requests must be greater than zero")
            }
            ValidationError::ZeroRelayTimeout => {
                write!(f, "relay.timeout_secs must be greater than zero")
            }
            ValidationError::ZeroConnectTimeout => {
                write!(f, "relay.connect_timeout_secs must be greater than zero")
            }
            ValidationError::ZeroMaxBodyBytes => {
                write!(f, "relay.max_body_bytes must be greater than zero")
            }
        }
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.cors.allowed_origins.iter().any(|o| o.trim().is_empty()) {
        errors.push(ValidationError::BlankAllowedOrigin);
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroRateLimitWindow);
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimitMax);
    }

    if config.relay.timeout_secs == 0 {
        errors.push(ValidationError::ZeroRelayTimeout);
    }
    if config.relay.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.relay.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroMaxBodyBytes);
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
