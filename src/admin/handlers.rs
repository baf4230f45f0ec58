use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::load_balancer::BackendRegistry;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub backends_total: usize,
    pub backends_alive: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendStatus {
    pub address: String,
    pub alive: bool,
}

pub async fn get_status(State(registry): State<Arc<BackendRegistry>>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends_total: registry.len(),
        backends_alive: registry.alive_count(),
    })
}

/// Backends in round-robin order.
pub async fn get_backends(State(registry): State<Arc<BackendRegistry>>) -> Json<Vec<BackendStatus>> {
    let statuses = registry
        .backends()
        .iter()
        .map(|b| BackendStatus {
            address: b.to_string(),
            alive: b.is_alive(),
        })
        .collect();

    Json(statuses)
}
