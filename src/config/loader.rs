//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML file into a config without validating it.
///
/// Overrides from the command line are applied afterwards, so validation is
/// left to [`finalize`].
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Validate a fully assembled config, normalising the upstream base URL.
pub fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    let trimmed = config.upstream.base_url.trim_end_matches('/').to_string();
    config.upstream.base_url = trimmed;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    finalize(read_config(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_trims_base_url() {
        let mut config = GatewayConfig::default();
        config.upstream.user = "u".into();
        config.upstream.password = "p".into();
        config.upstream.base_url = "http://builds.local:8111/".into();
        let config = finalize(config).unwrap();
        assert_eq!(config.upstream.base_url, "http://builds.local:8111");
    }

    #[test]
    fn test_finalize_reports_all_errors() {
        let err = finalize(GatewayConfig::default()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
