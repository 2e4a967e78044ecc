//! Shared utilities for integration tests: a programmable mock build server
//! and a gateway bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use artifact_gateway::config::GatewayConfig;
use artifact_gateway::http::HttpServer;
use artifact_gateway::lifecycle::Shutdown;
use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const BUILDS_PATH: &str = "/httpAuth/app/rest/builds/";
pub const CONTENT_PREFIX: &str = "/httpAuth/app/rest/builds/id:";

/// Basic-auth header for `ci:secret`.
pub const EXPECTED_AUTH: &str = "Basic Y2k6c2VjcmV0";

/// How the mock build server answers.
#[derive(Clone)]
pub struct Behaviour {
    /// Body of the build-list endpoint.
    pub builds_body: String,
    /// Body of any `.md5` sidecar; `None` answers 404 with an error page.
    pub checksum: Option<String>,
    /// Delay before answering a `.md5` request.
    pub checksum_delay: Option<Duration>,
    /// Artifact content; `None` answers with an error page.
    pub artifact: Option<Vec<u8>>,
    /// Serve the artifact chunked, without a Content-Length.
    pub artifact_without_length: bool,
    /// Serve an endless, slowly produced artifact instead of `artifact`.
    pub slow_artifact: Option<SlowArtifact>,
}

/// An artifact body that trickles out and reports when it is dropped.
#[derive(Clone)]
pub struct SlowArtifact {
    /// Declared Content-Length; never reached.
    pub length: u64,
    released: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl SlowArtifact {
    /// Returns the artifact and a receiver fired when its body is dropped.
    pub fn new(length: u64) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let artifact = Self {
            length,
            released: Arc::new(Mutex::new(Some(tx))),
        };
        (artifact, rx)
    }
}

/// Fires its sender when dropped.
struct DropSignal(Option<oneshot::Sender<()>>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        if let Some(tx) = self.0.take() {
            let _ = tx.send(());
        }
    }
}

impl Behaviour {
    /// Build 42 exists and serves `content`.
    pub fn build_42(content: &[u8]) -> Self {
        Self {
            builds_body: r#"{"count":1,"build":[{"id":42,"status":"SUCCESS"}]}"#.to_string(),
            checksum: None,
            checksum_delay: None,
            artifact: Some(content.to_vec()),
            artifact_without_length: false,
            slow_artifact: None,
        }
    }
}

/// One request received by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub locator: Option<String>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

#[derive(Clone)]
struct MockState {
    behaviour: Behaviour,
    log: Arc<Mutex<Vec<Recorded>>>,
}

/// Handle to a running mock build server.
pub struct MockUpstream {
    pub addr: SocketAddr,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn build_list_requests(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == BUILDS_PATH).collect()
    }

    /// Artifact content requests, excluding checksum sidecars.
    pub fn content_requests(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(CONTENT_PREFIX) && !r.path.ends_with(".md5"))
            .collect()
    }

    pub fn checksum_requests(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path.ends_with(".md5")).collect()
    }
}

/// Start a mock build server on an ephemeral port.
pub async fn start_upstream(behaviour: Behaviour) -> MockUpstream {
    let log = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        behaviour,
        log: log.clone(),
    };

    let app = Router::new().fallback(mock_handler).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, log }
}

async fn mock_handler(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let get_header = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let path = uri.path().to_string();

    state.log.lock().unwrap().push(Recorded {
        path: path.clone(),
        query: uri.query().map(str::to_string),
        locator: query.get("locator").cloned(),
        authorization: get_header(header::AUTHORIZATION),
        accept: get_header(header::ACCEPT),
    });

    let behaviour = &state.behaviour;

    if path == BUILDS_PATH {
        return behaviour.builds_body.clone().into_response();
    }

    if path.ends_with(".md5") {
        if let Some(delay) = behaviour.checksum_delay {
            tokio::time::sleep(delay).await;
        }
        return match &behaviour.checksum {
            Some(sum) => format!("{}\n", sum).into_response(),
            None => (StatusCode::NOT_FOUND, "Error has occurred during request processing (Not Found).")
                .into_response(),
        };
    }

    if path.starts_with(CONTENT_PREFIX) {
        if let Some(slow) = &behaviour.slow_artifact {
            return trickle(slow);
        }
        return match &behaviour.artifact {
            Some(content) if !behaviour.artifact_without_length => {
                (StatusCode::OK, content.clone()).into_response()
            }
            Some(content) => chunked(StatusCode::OK, content.clone()),
            None => chunked(
                StatusCode::NOT_FOUND,
                b"Error has occurred during request processing (Not Found).".to_vec(),
            ),
        };
    }

    (StatusCode::NOT_FOUND, "unknown endpoint").into_response()
}

/// An endless 16 KiB-per-tick body with a declared length.
fn trickle(slow: &SlowArtifact) -> Response {
    let guard = DropSignal(slow.released.lock().unwrap().take());
    let chunks = futures_util::stream::unfold(guard, |guard| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Some((Ok::<_, std::io::Error>(Bytes::from(vec![7u8; 16 * 1024])), guard))
    });

    let mut response = Response::new(Body::from_stream(chunks));
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(slow.length));
    response
}

/// A body with no declared length.
fn chunked(status: StatusCode, content: Vec<u8>) -> Response {
    let chunks = vec![Ok::<_, std::io::Error>(Bytes::from(content))];
    (status, Body::from_stream(futures_util::stream::iter(chunks))).into_response()
}

/// A running gateway.
pub struct Gateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gateway pointed at `upstream`, letting the caller adjust config.
pub async fn start_gateway(upstream: SocketAddr, tune: impl FnOnce(&mut GatewayConfig)) -> Gateway {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{}", upstream);
    config.upstream.user = "ci".to_string();
    config.upstream.password = "secret".to_string();
    config.upstream.use_system_proxy = false;
    tune(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
