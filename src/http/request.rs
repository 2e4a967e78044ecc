//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Parse `/buildTypeID/[tag]/artifactName` into [`RequestParams`]
//! - Forward the original query string as part of the artifact name
//!
//! # Design Decisions
//! - Build configuration and tag are percent-decoded: they become locator
//!   values, which the upstream client encodes again
//! - The artifact segment stays as it appears on the wire, since it is
//!   re-embedded into upstream URLs verbatim
//! - Anything but two or three non-empty segments is rejected before any
//!   upstream call is made

use std::net::SocketAddr;

use axum::http::{HeaderValue, Request};
use percent_encoding::percent_decode_str;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::GatewayError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Body of every 400 response.
pub const USAGE: &str = "invalid url, must be /buildTypeID/[tag]/artifactName";

/// Produces UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayRequestId;

impl MakeRequestId for GatewayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// What a single inbound request asks for. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub client_addr: Option<SocketAddr>,
    pub build_type_id: String,
    /// Empty means no tag filter.
    pub tag: String,
    /// May end with `?<query>` copied from the inbound request.
    pub artifact_name: String,
}

impl RequestParams {
    /// Parse a request path and optional query string.
    pub fn parse(
        path: &str,
        query: Option<&str>,
        client_addr: Option<SocketAddr>,
    ) -> Result<Self, GatewayError> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<&str> = path.split('/').collect();

        let (build_type_id, tag, artifact_name) = match segments.as_slice() {
            [build_type_id, artifact_name] => (*build_type_id, "", *artifact_name),
            [build_type_id, tag, artifact_name] if !tag.is_empty() => {
                (*build_type_id, *tag, *artifact_name)
            }
            _ => return Err(GatewayError::BadRequest),
        };

        if build_type_id.is_empty() || artifact_name.is_empty() {
            return Err(GatewayError::BadRequest);
        }

        let mut artifact_name = artifact_name.to_string();
        if let Some(query) = query {
            artifact_name.push('?');
            artifact_name.push_str(query);
        }

        Ok(Self {
            client_addr,
            build_type_id: decode_segment(build_type_id)?,
            tag: decode_segment(tag)?,
            artifact_name,
        })
    }
}

/// Percent-decode a path segment; non-UTF-8 results are a client error.
fn decode_segment(segment: &str) -> Result<String, GatewayError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| GatewayError::BadRequest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_segments_have_no_tag() {
        let params = RequestParams::parse("/MyBuild/myArtifact.zip", None, None).unwrap();
        assert_eq!(params.build_type_id, "MyBuild");
        assert_eq!(params.tag, "");
        assert_eq!(params.artifact_name, "myArtifact.zip");
    }

    #[test]
    fn test_three_segments_use_middle_as_tag() {
        let params = RequestParams::parse("/MyBuild/nightly/myArtifact.zip", None, None).unwrap();
        assert_eq!(params.tag, "nightly");
        assert_eq!(params.artifact_name, "myArtifact.zip");
    }

    #[test]
    fn test_query_appended_to_artifact_name() {
        let params = RequestParams::parse("/MyBuild/app.zip", Some("a=1&b=2"), None).unwrap();
        assert_eq!(params.artifact_name, "app.zip?a=1&b=2");
    }

    #[test]
    fn test_locator_segments_are_decoded() {
        let params =
            RequestParams::parse("/My%20Build/release%20candidate/app%20x.zip", None, None).unwrap();
        assert_eq!(params.build_type_id, "My Build");
        assert_eq!(params.tag, "release candidate");
        assert_eq!(params.artifact_name, "app%20x.zip");
    }

    #[test]
    fn test_invalid_utf8_segment_is_rejected() {
        assert!(matches!(
            RequestParams::parse("/My%FFBuild/app.zip", None, None),
            Err(GatewayError::BadRequest)
        ));
    }

    #[test]
    fn test_client_addr_is_kept() {
        let addr: SocketAddr = "10.0.0.9:51000".parse().unwrap();
        let params = RequestParams::parse("/B/a", None, Some(addr)).unwrap();
        assert_eq!(params.client_addr, Some(addr));
    }

    #[test]
    fn test_malformed_paths() {
        for path in [
            "/",
            "/MyBuild",
            "/MyBuild/",
            "//app.zip",
            "/MyBuild//app.zip",
            "/MyBuild/nightly/",
            "/a/b/c/d",
            "/MyBuild/nightly/app.zip/",
        ] {
            assert!(
                matches!(RequestParams::parse(path, None, None), Err(GatewayError::BadRequest)),
                "expected {} to be rejected",
                path
            );
        }
    }

    #[test]
    fn test_request_ids_are_unique() {
        let mut make = GatewayRequestId;
        let request = Request::new(());
        let a = make.make_request_id(&request).unwrap();
        let b = make.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
