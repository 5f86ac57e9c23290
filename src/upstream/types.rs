//! Upstream request/response types and error definitions.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;
use url::Url;

use crate::upstream::headers::HeaderList;

/// A single outbound GET.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Absolute target URL.
    pub target: Url,

    /// User-Agent to present upstream.
    pub user_agent: HeaderValue,
}

/// A fully buffered upstream response. Redirects are never followed, so a
/// 3xx arrives here with its `Location` intact.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderList,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// The first `Content-Type` value, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .first(&CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Errors that can occur while fetching the target.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Target is not an absolute URL.
    #[error("invalid target url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Upstream did not answer within the configured deadline.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// DNS, connect, TLS or protocol failure.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream body exceeded the buffering limit.
    #[error("upstream body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

/// Result type for upstream operations.
pub type FetchResult<T> = Result<T, FetchError>;
