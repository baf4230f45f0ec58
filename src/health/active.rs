//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends with a bounded TCP connect
//! - Update backend liveness based on results
//! - Log every liveness transition

use std::sync::Arc;
use std::time::Duration;
use futures_util::future::join_all;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::load_balancer::registry::BackendRegistry;
use crate::observability::metrics;

/// Why a probe failed. Expected and recurring; never escalated.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
}

/// Attempt a TCP connection to `authority` within `timeout`.
pub async fn probe(authority: &str, timeout: Duration) -> Result<(), ProbeError> {
    match time::timeout(timeout, TcpStream::connect(authority)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(ProbeError::Connect(e)),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}

pub struct HealthMonitor {
    registry: Arc<BackendRegistry>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(registry: Arc<BackendRegistry>, config: HealthCheckConfig) -> Self {
        Self { registry, config }
    }

    /// Run the monitor on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            timeout = self.config.timeout_secs,
            backends = self.registry.len(),
            "Health monitor starting"
        );

        let interval = Duration::from_secs(self.config.interval_secs);
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend once, in parallel, and apply the results.
    pub async fn check_all(&self) {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let backends = self.registry.backends();

        let results = join_all(backends.iter().map(|b| probe(b.authority(), timeout))).await;

        for (backend, result) in backends.iter().zip(results) {
            let healthy = result.is_ok();
            let was_alive = backend.set_alive(healthy);

            match (&result, was_alive) {
                (Err(e), true) => tracing::warn!(
                    backend = %backend,
                    old = "alive",
                    new = "dead",
                    error = %e,
                    "Health check failed, backend marked dead"
                ),
                (Ok(()), false) => tracing::info!(
                    backend = %backend,
                    old = "dead",
                    new = "alive",
                    "Health check succeeded, backend restored"
                ),
                (Err(e), false) => tracing::debug!(backend = %backend, error = %e, "Backend still dead"),
                (Ok(()), true) => tracing::debug!(backend = %backend, "Backend ok"),
            }

            metrics::record_backend_liveness(&backend.to_string(), healthy);
        }
    }
}
