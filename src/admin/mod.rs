//! Read-only admin API.
//!
//! Served on its own listener so admin paths never shadow proxied ones.

pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;

use self::handlers::*;
use crate::load_balancer::BackendRegistry;

pub fn setup_admin_router(registry: Arc<BackendRegistry>) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .with_state(registry)
}
