//! Response classification and header sanitization.
//!
//! # Responsibilities
//! - Drop headers whose only purpose is to block embedding
//! - Leave `Set-Cookie` to the cookie rewriter
//! - Drop framing and hop-by-hop headers; the server re-frames the body
//! - Forward the first value of every other header
//! - Decide whether a body is HTML or opaque bytes

use axum::http::header::{
    CONNECTION, CONTENT_LENGTH, CONTENT_SECURITY_POLICY, SET_COOKIE, TE, TRAILER,
    TRANSFER_ENCODING, UPGRADE, X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderName};

use crate::upstream::HeaderList;

/// How the response body is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Decoded as text and link-rewritten.
    Html,
    /// Forwarded byte-for-byte.
    Binary,
}

/// Classify a `Content-Type` value.
pub fn classify(content_type: Option<&str>) -> ContentKind {
    match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("text/html") => ContentKind::Html,
        _ => ContentKind::Binary,
    }
}

fn is_blocking(name: &HeaderName) -> bool {
    name == X_FRAME_OPTIONS || name == CONTENT_SECURITY_POLICY
}

fn is_framing(name: &HeaderName) -> bool {
    name == CONNECTION
        || name == CONTENT_LENGTH
        || name == TE
        || name == TRAILER
        || name == TRANSFER_ENCODING
        || name == UPGRADE
        || matches!(name.as_str(), "keep-alive" | "proxy-connection")
}

/// Build the outbound header set from the upstream headers.
pub fn sanitize(upstream: &HeaderList) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());

    for (name, values) in upstream.iter() {
        if is_blocking(name) || is_framing(name) || name == SET_COOKIE {
            continue;
        }
        if let Some(first) = values.first() {
            out.insert(name.clone(), first.clone());
        }
    }

    out
}
