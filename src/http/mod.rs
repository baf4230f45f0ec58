//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → forward.rs (select backend, proxy, fail over)
//!         → request.rs (buffer body, strip hop-by-hop, X-Forwarded-For)
//!     → response.rs (map exhausted/invalid requests to status codes)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder, HyperTransport, Transport, TransportError};
pub use request::{X_FORWARDED_FOR, X_REQUEST_ID};
pub use server::HttpServer;
