//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gatekeeper. All types derive Serde traits for deserialization from config
//! files, and every protection carries its own `enabled` toggle so checks can
//! be switched off without touching the code that consults them.

use serde::{Deserialize, Serialize};

/// Root configuration for the gatekeeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Listener configuration (bind address, request limits).
    pub listener: ListenerConfig,

    /// Sliding-window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// User-Agent signature bot detection.
    pub bot_detection: BotDetectionConfig,

    /// Request metrics aggregation.
    pub metrics: MetricsConfig,

    /// Validation/sanitization gateway.
    pub gateway: GatewayConfig,

    /// Admin API.
    pub admin: AdminConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Sliding-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum admitted requests per client within one window.
    pub max_requests: usize,

    /// Window duration in milliseconds.
    pub window_ms: u64,

    /// Interval between idle-key eviction sweeps, in seconds.
    pub idle_sweep_interval_secs: u64,

    /// A key is evicted once its newest timestamp is older than this many
    /// windows.
    pub idle_evict_after_windows: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_ms: 60_000,
            idle_sweep_interval_secs: 300,
            idle_evict_after_windows: 3,
        }
    }
}

/// Bot detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotDetectionConfig {
    /// Enable bot detection.
    pub enabled: bool,
}

impl Default for BotDetectionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Request metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable request metrics aggregation.
    pub enabled: bool,

    /// Expose a Prometheus scrape endpoint.
    pub exporter_enabled: bool,

    /// Prometheus exporter bind address.
    pub exporter_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exporter_enabled: false,
            exporter_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Validation/sanitization gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Report the gateway as active on the status surface.
    pub enabled: bool,

    /// Directory log files are served from.
    pub log_dir: String,

    /// Directory uploads are written to.
    pub upload_dir: String,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: "logs".to_string(),
            upload_dir: "uploads".to_string(),
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API listener.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
