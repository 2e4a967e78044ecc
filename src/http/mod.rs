//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (path → RequestParams, or 400)
//!     → resolver (latest build)
//!     → fetch engine (304 or artifact stream)
//!     → response.rs (status mapping, streamed body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{GatewayRequestId, RequestParams, USAGE, X_REQUEST_ID};
pub use response::GatewayError;
pub use server::{AppState, HttpServer};
