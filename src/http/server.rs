//! HTTP server setup and the gateway handler.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener with graceful shutdown
//! - Orchestrate resolver then fetch engine per request
//!
//! Each request runs in its own task with no shared mutable state; the only
//! shared value is the read-only upstream client.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, request::Parts, Request},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::fetch::{FetchEngine, FetchOutcome};
use crate::http::request::{GatewayRequestId, RequestParams, X_REQUEST_ID};
use crate::http::response::{self, GatewayError};
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::resolver::BuildResolver;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub resolver: BuildResolver,
    pub engine: FetchEngine,
}

impl AppState {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self {
            resolver: BuildResolver::new(client.clone()),
            engine: FetchEngine::new(client),
        }
    }
}

/// HTTP server for the artifact gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Arc::new(UpstreamClient::new(&config.upstream)?);
        Ok(Self {
            router: Self::build_router(AppState::new(client)),
        })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", get(gateway_handler))
            .route("/", get(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(GatewayRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler.
/// Parses the path, resolves the latest build and serves the artifact.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    // The body is unused; only the head is held across upstream calls.
    let (parts, _) = request.into_parts();
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = match serve_artifact(&state, &parts).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                path = %parts.uri.path(),
                status = %e.status(),
                error = %e,
                "Request failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start_time);
    response
}

async fn serve_artifact(state: &AppState, parts: &Parts) -> Result<Response, GatewayError> {
    let client_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let params = RequestParams::parse(parts.uri.path(), parts.uri.query(), client_addr)?;

    tracing::info!(
        client = ?params.client_addr,
        build_type_id = %params.build_type_id,
        tag = %params.tag,
        artifact = %params.artifact_name,
        "Artifact requested"
    );

    let build = state
        .resolver
        .resolve_latest(&params.build_type_id, &params.tag)
        .await?;

    let client_checksum = parts
        .headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let outcome = state
        .engine
        .conditional_fetch(&build, &params.artifact_name, client_checksum)
        .await?;

    Ok(match outcome {
        FetchOutcome::NotModified => response::not_modified(),
        FetchOutcome::Artifact { stream, length } => {
            tracing::debug!(build_id = %build, length = length, "Streaming artifact");
            response::artifact(stream, length)
        }
    })
}
