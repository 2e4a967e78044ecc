//! Build server REST API client.
//!
//! # Data Flow
//! ```text
//! resolver → list_builds(locator)        → raw JSON bytes
//! fetch    → fetch_text(<artifact>.md5)  → trimmed checksum
//! fetch    → fetch_stream(<artifact>)    → (live body stream, declared length)
//! ```
//!
//! # Design Decisions
//! - One upstream call per logical operation, never retried
//! - Fixed basic-auth credentials from the startup config
//! - Status codes are not interpreted here; callers inspect bodies

pub mod client;
pub mod types;

pub use client::{ArtifactStream, UpstreamClient};
pub use types::{BuildList, BuildRecord, UpstreamError, UpstreamResult};
