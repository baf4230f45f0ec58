//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness under a per-backend read/write lock
//! - Build upstream URIs for forwarded requests

use axum::http::{uri::PathAndQuery, Uri};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use url::Url;

use crate::config::ValidationError;

/// Parse a configured backend address into a normalised `http://host:port` URL.
///
/// Bare `host:port` is accepted and treated as plain HTTP.
pub fn parse_backend_url(address: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidBackendUrl {
        url: address.to_string(),
        reason,
    };

    let trimmed = address.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }

    Ok(url)
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    url: Url,
    /// `host:port`, used for probing and URI rewriting.
    authority: String,
    alive: RwLock<bool>,
}

impl Backend {
    /// Parse and create a backend. New backends start alive.
    pub fn parse(address: &str) -> Result<Self, ValidationError> {
        let url = parse_backend_url(address)?;
        // parse_backend_url guarantees a host, and http always has a known port
        let host = url.host_str().unwrap_or_default();
        let port = url.port_or_known_default().unwrap_or(80);

        Ok(Self {
            authority: format!("{}:{}", host, port),
            url,
            alive: RwLock::new(true),
        })
    }

    /// The normalised backend URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` of the backend.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Return true if the backend is currently believed reachable.
    pub fn is_alive(&self) -> bool {
        *self.alive.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        let mut guard = self.alive.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, alive)
    }

    /// Build the upstream URI for an inbound path and query.
    ///
    /// A base path on the backend URL is joined with the request path.
    pub fn target_uri(&self, path_and_query: Option<&PathAndQuery>) -> Result<Uri, axum::http::Error> {
        let (path, query) = match path_and_query {
            Some(pq) => (pq.path(), pq.query()),
            None => ("/", None),
        };

        let mut target = join_paths(self.url.path(), path);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        Uri::builder()
            .scheme("http")
            .authority(self.authority.as_str())
            .path_and_query(target)
            .build()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}", self.authority)
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
