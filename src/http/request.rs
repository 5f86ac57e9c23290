//! Inbound request extraction.
//!
//! # Responsibilities
//! - Read the `url` query parameter
//! - Work out the proxy base (scheme + host the client used to reach us)
//! - Pick the User-Agent to present upstream
//!
//! # Design Decisions
//! - The listener is plaintext, so the scheme is `http` unless forwarded
//!   headers are explicitly trusted
//! - Only the first entry of a comma-separated forwarded header counts

use axum::extract::FromRequestParts;
use axum::http::header::{HOST, USER_AGENT};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};

use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::rewrite::ProxyBase;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Query string of `GET /proxy`.
#[derive(Debug, Default)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

impl ProxyQuery {
    /// Parse a raw query string. The first `url` pair wins; other pairs
    /// and repeats are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let url = raw.and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, _)| name == "url")
                .map(|(_, value)| value.into_owned())
        });
        Self { url }
    }

    /// The raw target, if present and non-empty.
    pub fn target(self) -> Option<String> {
        self.url.filter(|url| !url.is_empty())
    }
}

fn first_forwarded<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Derive the proxy base for an inbound request.
pub fn resolve_proxy_base(headers: &HeaderMap, uri: &Uri, trust_forwarded: bool) -> Option<ProxyBase> {
    let forwarded = |name| {
        if trust_forwarded {
            first_forwarded(headers, name)
        } else {
            None
        }
    };

    let scheme = forwarded(X_FORWARDED_PROTO).unwrap_or("http");
    let host = forwarded(X_FORWARDED_HOST)
        .or_else(|| {
            headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
        })
        .or_else(|| uri.authority().map(|authority| authority.as_str()))?;

    Some(ProxyBase::new(scheme, host))
}

/// The caller's User-Agent, or `default` when absent or empty.
pub fn upstream_user_agent(headers: &HeaderMap, default: &HeaderValue) -> HeaderValue {
    headers
        .get(USER_AGENT)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| default.clone())
}

/// The request id assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

impl FromRequestParts<AppState> for ProxyBase {
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_proxy_base(&parts.headers, &parts.uri, state.trust_forwarded_headers)
            .ok_or(ProxyError::MissingHost)
    }
}
