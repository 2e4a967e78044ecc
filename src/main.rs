//! Latest-artifact gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                  ARTIFACT GATEWAY                    │
//!                    │                                                      │
//!   GET /cfg/[tag]/  │  ┌──────────┐    ┌──────────┐    ┌───────────────┐   │
//!   artifact ────────┼─▶│   http   │───▶│ resolver │───▶│   upstream    │───┼──▶ Build
//!                    │  │  server  │    │ (latest) │    │    client     │   │    Server
//!                    │  └────┬─────┘    └──────────┘    └───────▲───────┘   │    REST API
//!                    │       │                                  │           │
//!                    │       ▼          ┌──────────┐            │           │
//!   200 / 304 / 4xx ◀┼── response ◀────│  fetch   │────────────┘           │
//!   / 500            │                 │  engine  │  .md5 then content     │
//!                    │                 └──────────┘                        │
//!                    │                                                      │
//!                    │  config · observability · lifecycle · registry hook  │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use artifact_gateway::config::{loader, GatewayConfig};
use artifact_gateway::http::HttpServer;
use artifact_gateway::lifecycle::{wait_for_signal, Shutdown};
use artifact_gateway::observability::{logging, metrics};
use artifact_gateway::registry::{resolve_registry, Announcer};

#[derive(Parser, Debug)]
#[command(name = "artifact-gateway", version)]
#[command(about = "Serves the latest successful build's artifacts from a build server", long_about = None)]
struct Cli {
    /// TOML config file; flags and environment override its values
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Username to authenticate to the REST API as
    #[arg(long, env = "GATEWAY_REST_USER")]
    rest_user: Option<String>,

    /// Password to authenticate to the REST API with
    #[arg(long, env = "GATEWAY_REST_PASS", hide_env_values = true)]
    rest_pass: Option<String>,

    /// Address the REST API is listening on
    #[arg(long, env = "GATEWAY_REST_ADDR")]
    rest_addr: Option<String>,

    /// Address to listen for requests on
    #[arg(long, env = "GATEWAY_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Service registry host:port. Unset means don't announce
    #[arg(long, env = "GATEWAY_REGISTRY_ADDR")]
    registry_addr: Option<String>,

    /// Minimum log level
    #[arg(long, env = "GATEWAY_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Overlay flags onto a config read from defaults or a file.
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(user) = self.rest_user {
            config.upstream.user = user;
        }
        if let Some(password) = self.rest_pass {
            config.upstream.password = password;
        }
        if let Some(addr) = self.rest_addr {
            config.upstream.base_url = addr;
        }
        if let Some(addr) = self.listen_addr {
            config.listener.bind_address = addr;
        }
        if let Some(addr) = self.registry_addr {
            config.registry.address = Some(addr);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

fn build_config(mut cli: Cli) -> Result<GatewayConfig, loader::ConfigError> {
    let mut config = match cli.config.take() {
        Some(path) => loader::read_config(&path)?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config);
    loader::finalize(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(Cli::parse())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("artifact-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        user = %config.upstream.user,
        registry = ?config.registry.address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    // Subscribe before any signal can fire.
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let announcer_shutdown = shutdown.subscribe();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        });
    }

    if let Some(address) = &config.registry.address {
        let registry = resolve_registry(address).await?;
        let advertise = config
            .registry
            .advertise_address
            .clone()
            .unwrap_or_else(|| config.listener.bind_address.clone());
        let announcer = Announcer::new(registry, advertise, config.registry.clone());
        tokio::spawn(async move {
            if let Err(e) = announcer.run(announcer_shutdown).await {
                tracing::error!(error = %e, "Registry announcer stopped; continuing without announcement");
            }
        });
    } else {
        tracing::debug!("No registry address configured, skipping announcement");
    }

    let server = HttpServer::new(&config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
