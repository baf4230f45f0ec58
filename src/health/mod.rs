//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → TCP connect to each backend (bounded timeout)
//!     → Backend::set_alive(result)
//!
//! Passive detection (http/forward.rs):
//!     Transport failure while forwarding
//!     → Backend::set_alive(false)
//! ```
//!
//! # Design Decisions
//! - Only a successful probe brings a backend back
//! - Probes run in parallel; each backend's lock is held only for the flag write
//! - Health state is per-backend, not per-pool

pub mod active;

pub use active::{probe, HealthMonitor, ProbeError};
