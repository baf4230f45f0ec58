//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Config backends (ordered)
//!     → backend.rs (parse address, liveness flag)
//!     → registry.rs (fixed-length Arc'd list, never empty)
//!     → round_robin.rs (shared cursor, one lookup per call)
//!     → Forwarder decides: use it, or ask again
//! ```
//!
//! # Design Decisions
//! - Registry is immutable after construction; only liveness changes
//! - Cursor and per-backend locks are separate scopes and never nested
//! - Selection never performs I/O

use std::sync::Arc;

pub mod backend;
pub mod registry;
pub mod round_robin;

pub use backend::Backend;
pub use registry::BackendRegistry;
pub use round_robin::RoundRobin;

/// Outcome of a single cursor step.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Position of the backend in the registry.
    pub index: usize,
    pub backend: Arc<Backend>,
    /// Liveness observed at selection time.
    pub alive: bool,
}

/// A stateful backend selection policy.
pub trait Selector: Send + Sync {
    /// Advance the cursor once and report the backend under it.
    fn next(&self) -> Selection;

    /// Total cursor increments performed so far.
    fn cursor(&self) -> usize;

    /// Registry the selector walks.
    fn registry(&self) -> &Arc<BackendRegistry>;
}
