//! Conditional-fetch engine.
//!
//! # Responsibilities
//! - Short-circuit with `NotModified` when the client's checksum matches
//! - Otherwise open the artifact stream and report its declared length
//!
//! The returned stream is owned by the caller's request task. Dropping it,
//! whether fully drained or not, releases the upstream connection.

use std::sync::Arc;

use thiserror::Error;

use crate::fetch::descriptor::ArtifactDescriptor;
use crate::observability::metrics;
use crate::resolver::ResolvedBuild;
use crate::upstream::{ArtifactStream, UpstreamClient, UpstreamError};

/// Result of a conditional fetch.
pub enum FetchOutcome {
    /// The client's copy is current. No body.
    NotModified,
    /// The artifact body, streamed, with its declared length.
    Artifact { stream: ArtifactStream, length: u64 },
}

impl std::fmt::Debug for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::NotModified => f.write_str("NotModified"),
            FetchOutcome::Artifact { length, .. } => f
                .debug_struct("Artifact")
                .field("length", length)
                .finish_non_exhaustive(),
        }
    }
}

/// Errors that can occur during a conditional fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The checksum sidecar could not be retrieved.
    #[error("could not check hash: {0}")]
    ChecksumUnavailable(#[source] UpstreamError),

    /// The artifact itself could not be retrieved.
    #[error("{0}")]
    ArtifactUnavailable(#[source] UpstreamError),
}

/// Decides between `NotModified` and streaming the artifact.
#[derive(Debug, Clone)]
pub struct FetchEngine {
    client: Arc<UpstreamClient>,
}

impl FetchEngine {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self { client }
    }

    /// Fetch `artifact_name` of `build` unless `client_checksum` matches the
    /// upstream sidecar. An empty checksum always fetches.
    pub async fn conditional_fetch(
        &self,
        build: &ResolvedBuild,
        artifact_name: &str,
        client_checksum: &str,
    ) -> Result<FetchOutcome, FetchError> {
        let artifact = ArtifactDescriptor::new(build, artifact_name);

        if !client_checksum.is_empty() {
            let upstream_checksum = self
                .client
                .fetch_text(&artifact.checksum_path())
                .await
                .map_err(FetchError::ChecksumUnavailable)?;

            if !upstream_checksum.is_empty() && upstream_checksum == client_checksum {
                tracing::debug!(build_id = %build, artifact = %artifact.name(), "Checksum matched");
                metrics::record_not_modified();
                return Ok(FetchOutcome::NotModified);
            }
        }

        let (stream, length) = self
            .client
            .fetch_stream(&artifact.content_path())
            .await
            .map_err(FetchError::ArtifactUnavailable)?;

        Ok(FetchOutcome::Artifact { stream, length })
    }
}
