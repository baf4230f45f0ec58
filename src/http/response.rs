//! Response handling.
//!
//! Upstream responses are returned as-is apart from hop-by-hop header
//! removal (done in the forwarder). This module maps forwarding failures
//! to the status the client sees.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::forward::ForwardError;

impl ForwardError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::Body(_) => StatusCode::BAD_REQUEST,
            ForwardError::Uri(_) => StatusCode::BAD_GATEWAY,
            ForwardError::AllBackendsDead { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let body = match &self {
            ForwardError::AllBackendsDead { .. } => "No healthy backends".to_string(),
            other => other.to_string(),
        };
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ForwardError::AllBackendsDead { attempts: 3 }.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ForwardError::BodyTooLarge { limit: 10 }.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ForwardError::Body("reset".into()).status(), StatusCode::BAD_REQUEST);
    }
}
