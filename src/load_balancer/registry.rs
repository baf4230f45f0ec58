//! Backend registry.
//!
//! # Responsibilities
//! - Own the ordered, fixed-length backend list
//! - Reject an empty backend set at construction
//!
//! The list is read-only after construction, so it is shared via `Arc`
//! without a lock. Only each backend's liveness flag changes.

use std::sync::Arc;

use crate::config::{BackendConfig, ValidationError};
use crate::load_balancer::backend::Backend;

/// Ordered collection of backends. Insertion order is round-robin order.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: Vec<Arc<Backend>>,
}

impl BackendRegistry {
    /// Build a registry from already-constructed backends.
    pub fn new(backends: Vec<Backend>) -> Result<Self, ValidationError> {
        if backends.is_empty() {
            return Err(ValidationError::NoBackends);
        }
        Ok(Self {
            backends: backends.into_iter().map(Arc::new).collect(),
        })
    }

    /// Build a registry from configuration.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, ValidationError> {
        let backends = configs
            .iter()
            .map(|c| Backend::parse(&c.url))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(backends)
    }

    /// Number of backends. Always at least 1.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Backend at `index mod len`.
    pub fn get_wrapping(&self, index: usize) -> &Arc<Backend> {
        &self.backends[index % self.backends.len()]
    }

    /// All backends in registry order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Number of backends currently believed alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}
