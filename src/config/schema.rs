//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the artifact gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Build server REST API settings.
    pub upstream: UpstreamConfig,

    /// Optional service-registry announcement.
    pub registry: RegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8112").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8112".to_string(),
        }
    }
}

/// Build server REST API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base address of the REST API (e.g., "http://localhost:8111").
    pub base_url: String,

    /// Username for basic authentication.
    pub user: String,

    /// Password for basic authentication.
    pub password: String,

    /// Connection establishment timeout in seconds (0 = transport default).
    pub connect_timeout_secs: u64,

    /// Time allowed for upstream response headers in seconds (0 = unbounded).
    pub response_timeout_secs: u64,

    /// Honour HTTP(S)_PROXY from the environment for upstream calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8111".to_string(),
            user: String::new(),
            password: String::new(),
            connect_timeout_secs: 10,
            response_timeout_secs: 0,
            use_system_proxy: true,
        }
    }
}

// Never print the password.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("response_timeout_secs", &self.response_timeout_secs)
            .field("use_system_proxy", &self.use_system_proxy)
            .finish()
    }
}

/// Service-registry announcement configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry `host:port`. Unset means the gateway does not announce itself.
    pub address: Option<String>,

    /// Service name to register under.
    pub service_name: String,

    /// Address advertised to the registry (defaults to the listener bind address).
    pub advertise_address: Option<String>,

    /// Priority reported to the registry (lower is preferred).
    pub priority: u32,

    /// Weight reported to the registry among equal priorities.
    pub weight: u32,

    /// Consecutive failed connection attempts tolerated before giving up.
    pub reconnect_attempts: u32,

    /// Delay between reconnects, also used as the keepalive ping interval.
    pub reconnect_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: None,
            service_name: "artifact-gateway".to_string(),
            advertise_address: None,
            priority: 1,
            weight: 100,
            reconnect_attempts: 3,
            reconnect_interval_secs: 15,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
