//! Response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamResponse
//!     → location.rs   3xx + Location? → proxied Location, empty body (done)
//!     → headers.rs    drop embedding blockers, first value per header
//!     → cookies.rs    Set-Cookie directives rewritten one by one
//!     → headers.rs    classify Content-Type
//!         html   → html.rs (attribute pass, then bare-URL pass)
//!         binary → body forwarded untouched
//!     → ProxiedResponse
//! ```
//!
//! # Design Decisions
//! - Pure transformation: no I/O, no shared mutable state
//! - Per-link failures are recovered locally; the page is still returned

pub mod cookies;
pub mod headers;
pub mod html;
pub mod location;
pub mod proxy_url;

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use url::Url;

use crate::upstream::UpstreamResponse;

pub use self::cookies::CookieRewriter;
pub use self::headers::{classify, sanitize, ContentKind};
pub use self::html::{LinkRewriter, PatternLinkRewriter};
pub use self::proxy_url::{ProxyBase, PROXY_ROUTE};

/// Which branch of the pipeline produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Redirect,
    Html,
    Binary,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Redirect => "redirect",
            ResponseKind::Html => "html",
            ResponseKind::Binary => "binary",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The response handed back to the inbound client.
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    pub kind: ResponseKind,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Turns an upstream response into one that can be embedded and keeps
/// navigation on the proxy.
#[derive(Clone)]
pub struct ResponseRewriter {
    links: Arc<dyn LinkRewriter>,
    cookies: CookieRewriter,
}

impl ResponseRewriter {
    pub fn new(links: Arc<dyn LinkRewriter>, cookies: CookieRewriter) -> Self {
        Self { links, cookies }
    }

    pub fn rewrite(
        &self,
        upstream: UpstreamResponse,
        target: &Url,
        proxy: &ProxyBase,
    ) -> ProxiedResponse {
        if let Some(headers) = location::redirect_headers(&upstream, target, proxy) {
            return ProxiedResponse {
                kind: ResponseKind::Redirect,
                status: upstream.status,
                headers,
                body: Bytes::new(),
            };
        }

        let mut headers = sanitize(&upstream.headers);
        for cookie in self.cookies.rewrite_all(upstream.headers.get_all(&SET_COOKIE)) {
            headers.append(SET_COOKIE, cookie);
        }

        let (kind, body) = match classify(upstream.content_type()) {
            ContentKind::Html => {
                let text = String::from_utf8_lossy(&upstream.body);
                let rewritten = self.links.rewrite(&text, target, proxy);
                (ResponseKind::Html, Bytes::from(rewritten))
            }
            ContentKind::Binary => (ResponseKind::Binary, upstream.body),
        };

        ProxiedResponse {
            kind,
            status: upstream.status,
            headers,
            body,
        }
    }
}

impl Default for ResponseRewriter {
    fn default() -> Self {
        Self::new(Arc::new(PatternLinkRewriter), CookieRewriter::default())
    }
}

impl fmt::Debug for ResponseRewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseRewriter")
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE, LOCATION, X_FRAME_OPTIONS};
    use axum::http::{HeaderName, HeaderValue};

    use crate::upstream::HeaderList;

    fn upstream(status: u16, headers: &[(&str, &str)], body: &'static [u8]) -> UpstreamResponse {
        UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: headers
                .iter()
                .map(|(n, v)| {
                    (
                        HeaderName::from_bytes(n.as_bytes()).unwrap(),
                        HeaderValue::from_str(v).unwrap(),
                    )
                })
                .collect::<HeaderList>(),
            body: Bytes::from_static(body),
        }
    }

    fn target() -> Url {
        Url::parse("http://example.com/x/").unwrap()
    }

    fn proxy() -> ProxyBase {
        ProxyBase::new("http", "localhost:3000")
    }

    #[test]
    fn test_redirect_is_terminal() {
        let response = ResponseRewriter::default().rewrite(
            upstream(
                302,
                &[
                    ("Location", "/login"),
                    ("Set-Cookie", "a=1; Secure"),
                    ("Content-Type", "text/html"),
                ],
                b"<a href=\"/elsewhere\">",
            ),
            &target(),
            &proxy(),
        );

        assert_eq!(response.kind, ResponseKind::Redirect);
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers.len(), 1);
        assert_eq!(
            response.headers.get(LOCATION).unwrap(),
            proxy().wrap("http://example.com/login").as_str()
        );
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_html_rewritten_and_sanitized() {
        let response = ResponseRewriter::default().rewrite(
            upstream(
                200,
                &[
                    ("Content-Type", "text/html; charset=utf-8"),
                    ("X-Frame-Options", "SAMEORIGIN"),
                    ("Content-Security-Policy", "default-src 'self'"),
                    ("Set-Cookie", "sid=1; Domain=example.com; Secure; SameSite=None; Path=/"),
                    ("Set-Cookie", "theme=dark; HttpOnly"),
                ],
                b"<a href=\"/a/b\">go</a>",
            ),
            &target(),
            &proxy(),
        );

        assert_eq!(response.kind, ResponseKind::Html);
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.get(X_FRAME_OPTIONS).is_none());
        assert!(response.headers.get(CONTENT_SECURITY_POLICY).is_none());
        assert_eq!(
            response.headers.get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );

        let cookies: Vec<_> = response.headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, ["sid=1; Path=/", "theme=dark; HttpOnly"]);

        assert_eq!(
            response.body,
            format!("<a href=\"{}\">go</a>", proxy().wrap("http://example.com/a/b"))
        );
    }

    #[test]
    fn test_binary_passthrough_keeps_bytes_and_status() {
        let png: &'static [u8] = b"\x89PNG\r\n\x1a\nhttp://example.com/not-rewritten";
        let response = ResponseRewriter::default().rewrite(
            upstream(404, &[("Content-Type", "image/png")], png),
            &target(),
            &proxy(),
        );

        assert_eq!(response.kind, ResponseKind::Binary);
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(&response.body[..], png);
    }

    #[test]
    fn test_missing_content_type_is_binary() {
        let response = ResponseRewriter::default().rewrite(
            upstream(200, &[], b"<a href=\"/a\">"),
            &target(),
            &proxy(),
        );
        assert_eq!(response.kind, ResponseKind::Binary);
        assert_eq!(&response.body[..], b"<a href=\"/a\">");
    }

    #[test]
    fn test_no_cookies_no_cookie_header() {
        let response = ResponseRewriter::default().rewrite(
            upstream(200, &[("Content-Type", "text/plain")], b"ok"),
            &target(),
            &proxy(),
        );
        assert!(response.headers.get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_custom_link_rewriter_is_used() {
        struct Shout;
        impl LinkRewriter for Shout {
            fn rewrite(&self, html: &str, _: &Url, _: &ProxyBase) -> String {
                html.to_uppercase()
            }
        }

        let rewriter = ResponseRewriter::new(Arc::new(Shout), CookieRewriter::new(false));
        let response = rewriter.rewrite(
            upstream(200, &[("Content-Type", "text/html")], b"<p>hi</p>"),
            &target(),
            &proxy(),
        );
        assert_eq!(response.body, "<P>HI</P>");
    }

    fn raw_upstream(status: u16, headers: &[(&str, &[u8])]) -> UpstreamResponse {
        UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: headers
                .iter()
                .map(|(n, v)| {
                    (
                        HeaderName::from_bytes(n.as_bytes()).unwrap(),
                        HeaderValue::from_bytes(v).unwrap(),
                    )
                })
                .collect::<HeaderList>(),
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_non_ascii_cookie_is_rewritten() {
        let response = ResponseRewriter::default().rewrite(
            raw_upstream(
                200,
                &[(
                    "set-cookie",
                    "n=café; Domain=example.com; Secure; SameSite=None; Path=/".as_bytes(),
                )],
            ),
            &target(),
            &proxy(),
        );
        assert_eq!(
            response.headers.get(SET_COOKIE).unwrap().as_bytes(),
            "n=café; Path=/".as_bytes()
        );
    }

    #[test]
    fn test_non_ascii_location_stays_on_proxy() {
        let response = ResponseRewriter::default().rewrite(
            raw_upstream(302, &[("location", "/café".as_bytes())]),
            &target(),
            &proxy(),
        );
        assert_eq!(response.kind, ResponseKind::Redirect);
        assert_eq!(
            response.headers.get(LOCATION).unwrap(),
            proxy().wrap("http://example.com/caf%C3%A9").as_str()
        );
    }
}
