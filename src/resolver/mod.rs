//! Build resolution: "latest successful build matching a filter".
//!
//! # Data Flow
//! ```text
//! (build configuration id, tag)
//!     → locator.rs (fixed clauses + configuration + optional tag)
//!     → upstream list_builds
//!     → BuildList JSON → first record's id → ResolvedBuild
//! ```
//!
//! # Design Decisions
//! - Ordering is entirely the build server's; no local sorting
//! - Nothing is cached: "latest" is re-evaluated on every request
//! - A body that does not parse as a build list is an upstream error page

pub mod locator;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::upstream::{BuildList, UpstreamClient, UpstreamError};

pub use locator::Locator;

/// Identifier of the build a request resolved to. Request-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuild(String);

impl ResolvedBuild {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ResolvedBuild {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ResolvedBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while resolving a build.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The query succeeded but matched no build.
    #[error("{}", not_found_message(.tag))]
    NotFound { tag: String },

    /// Transport failure or an unparsable upstream response.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

fn not_found_message(tag: &str) -> String {
    if tag.is_empty() {
        "no builds found".to_string()
    } else {
        format!("no builds with tag '{}' found", tag)
    }
}

/// Resolves build configuration + tag to the newest successful build.
#[derive(Debug, Clone)]
pub struct BuildResolver {
    client: Arc<UpstreamClient>,
}

impl BuildResolver {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self { client }
    }

    /// Resolve the most recent successful build of `build_type_id`,
    /// restricted to builds carrying `tag` when it is non-empty.
    pub async fn resolve_latest(
        &self,
        build_type_id: &str,
        tag: &str,
    ) -> Result<ResolvedBuild, ResolveError> {
        let locator = Locator::latest_successful(build_type_id, tag);
        let body = self.client.list_builds(locator.clauses()).await?;

        let build = parse_build_list(&body, tag)?;
        tracing::debug!(build_type_id = %build_type_id, tag = %tag, build_id = %build, "Resolved latest build");
        Ok(build)
    }
}

/// Interpret a build-list body, taking the first record.
pub fn parse_build_list(body: &[u8], tag: &str) -> Result<ResolvedBuild, ResolveError> {
    let list: BuildList = serde_json::from_slice(body).map_err(|_| {
        UpstreamError::ErrorBody(String::from_utf8_lossy(body).into_owned())
    })?;

    list.builds
        .first()
        .map(|record| ResolvedBuild::from(record.id))
        .ok_or_else(|| ResolveError::NotFound { tag: tag.to_string() })
}
