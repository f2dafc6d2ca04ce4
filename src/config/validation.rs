//! Configuration validation.
//!
//! Semantic checks on top of what serde already enforces syntactically:
//! value ranges, parseable addresses, and keys that must not be empty.
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use crate::config::schema::GatekeeperConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "rate_limit.max_requests").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            "not a valid socket address",
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(err("listener.max_body_bytes", "must be greater than zero"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(err(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(err("rate_limit.max_requests", "must be greater than zero"));
    }
    if config.rate_limit.window_ms == 0 {
        errors.push(err("rate_limit.window_ms", "must be greater than zero"));
    }
    if config.rate_limit.idle_evict_after_windows == 0 {
        errors.push(err(
            "rate_limit.idle_evict_after_windows",
            "must be greater than zero",
        ));
    }
    if config.rate_limit.idle_sweep_interval_secs == 0 {
        errors.push(err(
            "rate_limit.idle_sweep_interval_secs",
            "must be greater than zero",
        ));
    }

    if config.metrics.exporter_enabled
        && config.metrics.exporter_address.parse::<SocketAddr>().is_err()
    {
        errors.push(err(
            "metrics.exporter_address",
            "not a valid socket address",
        ));
    }

    if config.gateway.max_upload_bytes == 0 {
        errors.push(err("gateway.max_upload_bytes", "must be greater than zero"));
    }
    if config.gateway.log_dir.is_empty() {
        errors.push(err("gateway.log_dir", "must not be empty"));
    }
    if config.gateway.upload_dir.is_empty() {
        errors.push(err("gateway.upload_dir", "must not be empty"));
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(err("admin.api_key", "must not be empty"));
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(err("admin.bind_address", "not a valid socket address"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
