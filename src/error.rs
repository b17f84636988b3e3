//! Unified error types for the dashboard aggregator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::indicator::{Envelope, SourceId};

/// Errors raised inside the fetch layer.
///
/// Per-code failures never leave `fetch_many`; only a hard batch failure
/// (client construction) or a single-fetch caller sees these.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Could not construct the per-batch HTTP client.
    #[error("failed to build http client: {0}")]
    ClientBuild(String),

    /// HTTP request failed (timeout, connection error).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-2xx status.
    #[error("upstream {source_id} returned HTTP {status} for {code}")]
    UpstreamStatus {
        /// Which upstream failed.
        source_id: SourceId,
        /// HTTP status returned.
        status: u16,
        /// Indicator code being fetched.
        code: String,
    },

    /// Response body was not the shape the upstream documents.
    #[error("unexpected payload from {source_id}: {reason}")]
    MalformedPayload {
        /// Which upstream produced the payload.
        source_id: SourceId,
        /// What was wrong with it.
        reason: String,
    },
}

/// Errors surfaced at the endpoint boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Whole-batch upstream failure.
    #[error("upstream fetch failed: {0}")]
    Source(#[from] SourceError),

    /// Requested entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Proxy target host is not on the allow-list.
    #[error("proxy target not allowed: {0}")]
    ProxyForbidden(String),

    /// Proxy target could not be parsed as a URL.
    #[error("invalid proxy url: {0}")]
    ProxyBadUrl(String),

    /// Proxy target answered with an error status.
    #[error("proxy upstream returned HTTP {0}")]
    ProxyUpstream(u16),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ProxyForbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ProxyBadUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::ProxyUpstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(Envelope::<()>::error(self.to_string()));
        (status, body).into_response()
    }
}

/// Convenient Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::NotFound("indicator FOO".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ProxyForbidden("evil.example".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        let source = SourceError::ClientBuild("boom".to_string());
        assert_eq!(
            ApiError::Source(source).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
