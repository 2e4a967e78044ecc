//! Conditional artifact retrieval.
//!
//! # Data Flow
//! ```text
//! (ResolvedBuild, artifact name, client checksum)
//!     → descriptor.rs (content + checksum sidecar paths)
//!     → engine.rs:
//!         checksum given?  fetch <name>.md5 → equal? → NotModified
//!         otherwise        fetch <name>     → Artifact { stream, length }
//! ```
//!
//! # Design Decisions
//! - The `.md5` sidecar stands in for ETag support the build server lacks
//! - The small sidecar is fetched first so unchanged artifacts never transfer
//! - Checksum and artifact failures are distinct error variants

pub mod descriptor;
pub mod engine;

pub use descriptor::ArtifactDescriptor;
pub use engine::{FetchEngine, FetchError, FetchOutcome};
