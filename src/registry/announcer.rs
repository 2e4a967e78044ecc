//! Keeps this gateway registered with the service registry.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::lookup_host;
use tokio::time;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::config::RegistryConfig;
use crate::lifecycle::ShutdownListener;

/// Errors that can occur while announcing.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not resolve registry address {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry address {0} resolved to nothing")]
    NoAddress(String),

    #[error("registry connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("gave up after {attempts} failed registry connections: {last}")]
    AttemptsExhausted { attempts: u32, last: String },
}

/// Resolve the registry `host:port` to a socket address.
pub async fn resolve_registry(address: &str) -> Result<SocketAddr, RegistryError> {
    let mut addrs = lookup_host(address)
        .await
        .map_err(|source| RegistryError::Resolve {
            address: address.to_string(),
            source,
        })?;
    addrs
        .next()
        .ok_or_else(|| RegistryError::NoAddress(address.to_string()))
}

/// Holds a provider session open with the registry.
#[derive(Debug, Clone)]
pub struct Announcer {
    registry: SocketAddr,
    advertise: String,
    config: RegistryConfig,
}

impl Announcer {
    pub fn new(registry: SocketAddr, advertise: impl Into<String>, config: RegistryConfig) -> Self {
        Self {
            registry,
            advertise: advertise.into(),
            config,
        }
    }

    /// Session URL announcing this gateway.
    pub fn provide_url(&self) -> String {
        let mut url = match url::Url::parse(&format!("ws://{}/provide", self.registry)) {
            Ok(url) => url,
            Err(_) => return format!("ws://{}/provide", self.registry),
        };
        url.query_pairs_mut()
            .append_pair("service", &self.config.service_name)
            .append_pair("host", &self.advertise)
            .append_pair("priority", &self.config.priority.to_string())
            .append_pair("weight", &self.config.weight.to_string());
        url.to_string()
    }

    /// Announce until shutdown, reconnecting when the session drops.
    pub async fn run(self, mut shutdown: ShutdownListener) -> Result<(), RegistryError> {
        let interval = Duration::from_secs(self.config.reconnect_interval_secs.max(1));
        let mut failures = 0u32;

        tracing::info!(
            registry = %self.registry,
            service = %self.config.service_name,
            advertise = %self.advertise,
            "Registry announcer starting"
        );

        loop {
            let session = tokio::select! {
                result = self.session(interval) => result,
                _ = shutdown.recv() => {
                    tracing::info!("Registry announcer received shutdown signal, exiting loop");
                    return Ok(());
                }
            };

            match session {
                Ok(()) => {
                    failures = 0;
                    tracing::warn!(registry = %self.registry, "Registry session ended, reconnecting");
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        registry = %self.registry,
                        attempt = failures,
                        error = %e,
                        "Registry connection failed"
                    );
                    if failures >= self.config.reconnect_attempts {
                        return Err(RegistryError::AttemptsExhausted {
                            attempts: failures,
                            last: e.to_string(),
                        });
                    }
                }
            }

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.recv() => return Ok(()),
            }
        }
    }

    /// One provider session. Only a failed connect is an error; a session
    /// that was established and later dropped returns `Ok`.
    async fn session(&self, interval: Duration) -> Result<(), RegistryError> {
        let (mut ws, _) = connect_async(self.provide_url()).await?;
        tracing::info!(registry = %self.registry, "Announced to service registry");

        let mut ticker = time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = ws.send(Message::Ping(Default::default())).await {
                        tracing::debug!(error = %e, "Registry keepalive failed");
                        return Ok(());
                    }
                }
                message = ws.next() => match message {
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Registry session error");
                        return Ok(());
                    }
                },
            }
        }
    }
}
