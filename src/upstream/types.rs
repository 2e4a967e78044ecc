//! Upstream wire types and error definitions.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while talking to the build server.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure (DNS, connect, reset, body read).
    #[error("upstream unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// No response headers within the configured window.
    #[error("upstream did not respond within {0} seconds")]
    Timeout(u64),

    /// The build server answered with an error page; its body is the detail.
    #[error("{0}")]
    ErrorBody(String),
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Body of the build-list endpoint.
///
/// An empty result omits the `build` key entirely, hence the default.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildList {
    #[serde(rename = "build", default)]
    pub builds: Vec<BuildRecord>,
}

/// A single build record. Only the numeric ID is used.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildRecord {
    pub id: u64,
}
