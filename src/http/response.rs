//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Turn a `ProxiedResponse` into the outbound HTTP response
//! - Map pipeline errors to status codes with generic bodies
//! - Convert panics in the pipeline into 502s
//!
//! # Design Decisions
//! - Error details go to the log only; clients see `missing url` or
//!   `proxy error`
//! - Content-Length is derived from the buffered body, never copied

use std::any::Any;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::rewrite::ProxiedResponse;
use crate::upstream::FetchError;

/// Body sent for every upstream or internal failure.
pub const PROXY_ERROR_BODY: &str = "proxy error";

/// Errors surfaced by the proxy route.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No `url` query parameter, or an empty one.
    #[error("missing url")]
    MissingUrl,

    /// No Host header or URI authority to build proxied links from.
    #[error("missing host")]
    MissingHost,

    /// The upstream could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl | ProxyError::MissingHost => StatusCode::BAD_REQUEST,
            ProxyError::Fetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Metrics label for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MissingUrl | ProxyError::MissingHost => "client_error",
            ProxyError::Fetch(_) => "upstream_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ProxyError::MissingUrl => "missing url",
            ProxyError::MissingHost => "missing host",
            ProxyError::Fetch(_) => PROXY_ERROR_BODY,
        };
        (status, body).into_response()
    }
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Response for a panic caught at the outermost layer.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail: &str = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    (StatusCode::BAD_GATEWAY, PROXY_ERROR_BODY).into_response()
}
