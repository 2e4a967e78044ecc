//! Authenticated HTTP client for the build server REST API.
//!
//! # Responsibilities
//! - Attach basic-auth credentials to every call
//! - Query the build list as JSON
//! - Read small text bodies (checksum sidecars)
//! - Hand live artifact bodies to the caller without buffering

use std::time::Duration;

use axum::body::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response};
use tokio::time::timeout;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::types::{UpstreamError, UpstreamResult};

/// REST API prefix for basic-auth access.
const REST_PREFIX: &str = "httpAuth/app/rest";

/// A streamed artifact body. Dropping it releases the upstream connection.
pub type ArtifactStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Client for the build server. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    response_timeout: Option<Duration>,
}

impl UpstreamClient {
    /// Create a client from the upstream section of the config.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if config.connect_timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let response_timeout = (config.response_timeout_secs > 0)
            .then(|| Duration::from_secs(config.response_timeout_secs));

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            response_timeout,
        })
    }

    /// Absolute URL for a path below the REST prefix.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, path)
    }

    /// Query the build list with the given locator clauses.
    ///
    /// Returns the raw body; interpreting it is the resolver's job.
    pub async fn list_builds(&self, locator: &[String]) -> UpstreamResult<Bytes> {
        let result = self.try_list_builds(locator).await;
        metrics::record_upstream_call("list_builds", result.is_ok());
        result
    }

    /// Fetch a small text body and trim surrounding whitespace.
    pub async fn fetch_text(&self, path: &str) -> UpstreamResult<String> {
        let result = self.try_fetch_text(path).await;
        metrics::record_upstream_call("fetch_text", result.is_ok());
        result
    }

    /// Open a streamed body and return it with its declared length.
    ///
    /// A response without a declared length is treated as an upstream error
    /// page: it is read fully and returned as [`UpstreamError::ErrorBody`].
    pub async fn fetch_stream(&self, path: &str) -> UpstreamResult<(ArtifactStream, u64)> {
        let result = self.try_fetch_stream(path).await;
        metrics::record_upstream_call("fetch_stream", result.is_ok());
        result
    }

    async fn try_list_builds(&self, locator: &[String]) -> UpstreamResult<Bytes> {
        let request = self
            .get(&self.url("builds/"))
            .query(&[("locator", locator.join(","))])
            .header(ACCEPT, "application/json");

        let response = self.send(request).await?;
        tracing::debug!(status = %response.status(), "Fetched build list");
        Ok(response.bytes().await?)
    }

    async fn try_fetch_text(&self, path: &str) -> UpstreamResult<String> {
        let response = self.send(self.get(&self.url(path))).await?;
        tracing::debug!(path = %path, status = %response.status(), "Fetched text body");
        Ok(response.text().await?.trim().to_string())
    }

    async fn try_fetch_stream(&self, path: &str) -> UpstreamResult<(ArtifactStream, u64)> {
        let response = self.send(self.get(&self.url(path))).await?;
        tracing::debug!(
            path = %path,
            status = %response.status(),
            content_length = ?response.content_length(),
            "Opened artifact stream"
        );

        match response.content_length() {
            Some(length) => Ok((response.bytes_stream().boxed(), length)),
            // Error pages arrive without a length; the body is the detail.
            None => Err(UpstreamError::ErrorBody(response.text().await?)),
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
    }

    async fn send(&self, request: RequestBuilder) -> UpstreamResult<Response> {
        let pending = request.send();
        match self.response_timeout {
            Some(limit) => match timeout(limit, pending).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(UpstreamError::Timeout(limit.as_secs())),
            },
            None => Ok(pending.await?),
        }
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}
