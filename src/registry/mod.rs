//! Service-registry announcement.
//!
//! # Data Flow
//! ```text
//! registry.address (host:port)
//!     → resolve_registry (DNS, fatal at startup on failure)
//!     → Announcer::run
//!         → WebSocket /provide?service=..&host=..&priority=..&weight=..
//!         → held open with pings; reconnect on drop
//!         → gives up after N consecutive failed connects
//! ```
//!
//! # Design Decisions
//! - Optional hook started by bootstrap; the gateway never depends on it
//! - An established session resets the failure count

pub mod announcer;

pub use announcer::{resolve_registry, Announcer, RegistryError};
