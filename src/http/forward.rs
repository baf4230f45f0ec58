//! Failover-aware request forwarding.
//!
//! # Responsibilities
//! - Pick a backend through the selector
//! - Proxy the request and hand back the upstream response untouched
//! - On transport failure, mark the backend dead and try the next one
//!
//! # Design Decisions
//! - Cursor picks are bounded by the registry size; each backend is tried at most once
//! - Live backends the shared cursor skipped are swept in order before a 503
//! - Upstream 4xx/5xx are responses, not failures, and are passed through
//! - Body is buffered once so it can be replayed on failover

use axum::body::{Body, Bytes};
use axum::http::{request::Parts, Request, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time;

use crate::config::{BalancerConfig, TimeoutConfig};
use crate::http::request::{append_forwarded_for, read_body, request_id, strip_hop_by_hop};
use crate::load_balancer::{Backend, BackendRegistry, RoundRobin, Selection, Selector};
use crate::observability::metrics;

/// A single upstream attempt failed before a response arrived.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Errors that end a forwarded request without an upstream response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("failed to build upstream request: {0}")]
    Uri(#[from] axum::http::Error),

    #[error("no backend answered after {attempts} attempts")]
    AllBackendsDead { attempts: usize },
}

/// Sends one request to one upstream.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, TransportError>> + Send;
}

/// HTTP/1.1 transport on the hyper-util client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HyperTransport {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) => Err(TransportError::Upstream(e)),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}

/// Per-request handler: select, proxy, fail over.
pub struct Forwarder<S = RoundRobin, T = HyperTransport> {
    selector: S,
    transport: T,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Build the production forwarder over a registry.
    pub fn from_config(registry: Arc<BackendRegistry>, config: &BalancerConfig) -> Self {
        Self::new(
            RoundRobin::new(registry),
            HyperTransport::new(&config.timeouts),
            config.limits.max_body_bytes,
        )
    }
}

impl<S: Selector, T: Transport> Forwarder<S, T> {
    pub fn new(selector: S, transport: T, max_body_bytes: usize) -> Self {
        Self {
            selector,
            transport,
            max_body_bytes,
        }
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Forward `request` to the next live backend, failing over on transport errors.
    pub async fn forward(
        &self,
        request: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Response<Body>, ForwardError> {
        let start_time = Instant::now();
        let (mut parts, body) = request.into_parts();
        let request_id = request_id(&parts.headers).to_string();
        let method = parts.method.to_string();

        let body = match read_body(body, self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejecting request body");
                return Err(e);
            }
        };

        strip_hop_by_hop(&mut parts.headers);
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut parts.headers, ip);
        }

        let registry = self.selector.registry().clone();
        let attempts = registry.len();
        let mut tried = vec![false; attempts];

        for attempt in 1..=attempts {
            let Selection { index, backend, alive } = self.selector.next();

            if !alive {
                tracing::debug!(request_id = %request_id, backend = %backend, attempt, "Skipping dead backend");
                continue;
            }
            if std::mem::replace(&mut tried[index], true) {
                tracing::debug!(request_id = %request_id, backend = %backend, attempt, "Backend already tried");
                continue;
            }

            if let Some(response) = self.send_to(&backend, &parts, &body, &request_id, attempt).await? {
                metrics::record_request(&method, response.status().as_u16(), &backend.to_string(), start_time);
                return Ok(response);
            }
        }

        // Concurrent requests share the cursor and may have stepped over live
        // backends; sweep the untried ones in registry order before giving up.
        for (index, backend) in registry.backends().iter().enumerate() {
            if tried[index] || !backend.is_alive() {
                continue;
            }
            tried[index] = true;

            tracing::debug!(request_id = %request_id, backend = %backend, "Sweeping untried backend");
            if let Some(response) = self.send_to(backend, &parts, &body, &request_id, attempts).await? {
                metrics::record_request(&method, response.status().as_u16(), &backend.to_string(), start_time);
                return Ok(response);
            }
        }

        tracing::error!(request_id = %request_id, attempts, "All backends exhausted");
        metrics::record_request(&method, 503, "none", start_time);
        Err(ForwardError::AllBackendsDead { attempts })
    }

    /// One upstream attempt. `None` means a transport failure; the backend is now dead.
    async fn send_to(
        &self,
        backend: &Backend,
        parts: &Parts,
        body: &Bytes,
        request_id: &str,
        attempt: usize,
    ) -> Result<Option<Response<Body>>, ForwardError> {
        let mut upstream = Request::new(Body::from(body.clone()));
        *upstream.method_mut() = parts.method.clone();
        *upstream.uri_mut() = backend.target_uri(parts.uri.path_and_query())?;
        *upstream.headers_mut() = parts.headers.clone();

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            uri = %upstream.uri(),
            attempt,
            "Proxying request"
        );

        match self.transport.send(upstream).await {
            Ok(mut response) => {
                strip_hop_by_hop(response.headers_mut());
                Ok(Some(response))
            }
            Err(e) => {
                if backend.set_alive(false) {
                    tracing::warn!(
                        request_id = %request_id,
                        backend = %backend,
                        old = "alive",
                        new = "dead",
                        attempt,
                        error = %e,
                        "Upstream error, backend marked dead"
                    );
                } else {
                    tracing::warn!(request_id = %request_id, backend = %backend, attempt, error = %e, "Upstream error");
                }
                metrics::record_failover(&backend.to_string());
                metrics::record_backend_liveness(&backend.to_string(), false);
                Ok(None)
            }
        }
    }
}
