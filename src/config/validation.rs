//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required credentials are present
//! - Addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },

    #[error("upstream.base_url is not an http(s) URL: {0}")]
    BadUrl(String),
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.user.is_empty() {
        errors.push(ValidationError::Missing("upstream.user"));
    }
    if config.upstream.password.is_empty() {
        errors.push(ValidationError::Missing("upstream.password"));
    }

    match url::Url::parse(&config.upstream.base_url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => {}
        _ => errors.push(ValidationError::BadUrl(config.upstream.base_url.clone())),
    }

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::BadAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Some(address) = &config.registry.address {
        if address.is_empty() {
            errors.push(ValidationError::Missing("registry.address"));
        }
        // The bind address is advertised when nothing else is given; a
        // wildcard address is useless to registry consumers.
        if config.registry.advertise_address.is_none()
            && binds_unspecified(&config.listener.bind_address)
        {
            errors.push(ValidationError::Missing("registry.advertise_address"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a numeric port. Hostnames are
/// resolved at bind time.
fn is_host_port(value: &str) -> bool {
    if value.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match value.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok(),
        None => false,
    }
}

fn binds_unspecified(value: &str) -> bool {
    value
        .parse::<SocketAddr>()
        .map(|addr| addr.ip().is_unspecified())
        .unwrap_or(false)
}
