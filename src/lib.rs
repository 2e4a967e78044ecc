//! Latest-artifact gateway library.
//!
//! Translates `/buildTypeID/[tag]/artifactName` requests into build server
//! REST calls, serving the newest successful build's artifact with
//! checksum-based conditional retrieval.

pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resolver;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
