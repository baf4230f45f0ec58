//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{registry::BackendRegistry, Selection, Selector};

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
///
/// Each call consumes exactly one cursor slot and reads one backend's
/// liveness. Dead backends are reported, not skipped; the caller decides
/// whether to ask again.
#[derive(Debug)]
pub struct RoundRobin {
    registry: Arc<BackendRegistry>,
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            counter: AtomicUsize::new(0),
        }
    }
}

impl Selector for RoundRobin {
    fn next(&self) -> Selection {
        let slot = self.counter.fetch_add(1, Ordering::Relaxed);
        let index = slot % self.registry.len();
        let backend = self.registry.get_wrapping(index).clone();
        let alive = backend.is_alive();
        Selection { index, backend, alive }
    }

    fn cursor(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }

    fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }
}
