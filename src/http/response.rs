//! Response handling.
//!
//! # Responsibilities
//! - Map gateway errors to status codes with a plain-text detail
//! - Build 304 and streamed 200 responses
//!
//! # Design Decisions
//! - Artifact bodies are streamed straight from upstream, never buffered
//! - Every resolution or upstream failure is a 500; only path errors are 400

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::fetch::FetchError;
use crate::http::request::USAGE;
use crate::resolver::ResolveError;
use crate::upstream::ArtifactStream;

/// Anything that ends a gateway request early.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed request path.
    #[error("{}", USAGE)]
    BadRequest,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest => StatusCode::BAD_REQUEST,
            GatewayError::Resolve(_) | GatewayError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Empty 304 response.
pub fn not_modified() -> Response {
    StatusCode::NOT_MODIFIED.into_response()
}

/// 200 response streaming the artifact with its declared length.
pub fn artifact(stream: ArtifactStream, length: u64) -> Response {
    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::BadRequest.status(), StatusCode::BAD_REQUEST);

        let not_found = GatewayError::from(ResolveError::NotFound { tag: "nightly".into() });
        assert_eq!(not_found.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let fetch = GatewayError::from(FetchError::ArtifactUnavailable(UpstreamError::ErrorBody(
            "gone".into(),
        )));
        assert_eq!(fetch.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fetch.to_string(), "gone");
    }

    #[tokio::test]
    async fn test_error_body_is_detail() {
        let response = GatewayError::BadRequest.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body, USAGE.as_bytes());
    }

    #[test]
    fn test_not_modified_is_empty() {
        let response = not_modified();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    }
}
