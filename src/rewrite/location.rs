//! Redirect rewriting.
//!
//! A 3xx with a non-empty `Location` short-circuits the pipeline: the
//! client receives the original status, a proxied `Location` and nothing
//! else.

use std::borrow::Cow;

use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue};
use url::Url;

use crate::rewrite::proxy_url::ProxyBase;
use crate::upstream::UpstreamResponse;

/// Header bytes as text: UTF-8 when valid, otherwise Latin-1.
fn decode(value: &HeaderValue) -> Cow<'_, str> {
    match std::str::from_utf8(value.as_bytes()) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(value.as_bytes().iter().map(|&b| char::from(b)).collect()),
    }
}

/// Proxied form of an upstream `Location`.
///
/// Non-ASCII characters are percent-encoded by URL resolution. A location
/// that cannot be resolved is returned unchanged.
pub fn proxied_location(location: &HeaderValue, target: &Url, proxy: &ProxyBase) -> HeaderValue {
    proxy
        .resolve_and_wrap(&decode(location), target)
        .and_then(|wrapped| HeaderValue::from_str(&wrapped).ok())
        .unwrap_or_else(|| location.clone())
}

/// Outbound headers for a redirect, or `None` when `upstream` is not one.
pub fn redirect_headers(upstream: &UpstreamResponse, target: &Url, proxy: &ProxyBase) -> Option<HeaderMap> {
    if !upstream.status.is_redirection() {
        return None;
    }
    let location = upstream
        .headers
        .first(&LOCATION)
        .filter(|value| !value.is_empty())?;

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, proxied_location(location, target, proxy));
    Some(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
    use axum::http::StatusCode;

    use crate::upstream::HeaderList;

    fn response(status: u16, headers: &[(axum::http::HeaderName, &'static str)]) -> UpstreamResponse {
        UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: headers
                .iter()
                .map(|(n, v)| (n.clone(), HeaderValue::from_static(v)))
                .collect::<HeaderList>(),
            body: Bytes::from_static(b"moved"),
        }
    }

    fn proxy() -> ProxyBase {
        ProxyBase::new("http", "localhost:3000")
    }

    #[test]
    fn test_relative_location_resolved_against_target() {
        let target = Url::parse("http://example.com/x/page").unwrap();
        let upstream = response(302, &[(LOCATION, "../login?next=/x")]);

        let headers = redirect_headers(&upstream, &target, &proxy()).unwrap();
        assert_eq!(
            headers.get(LOCATION).unwrap(),
            "http://localhost:3000/proxy?url=http%3A%2F%2Fexample.com%2Flogin%3Fnext%3D%2Fx"
        );
    }

    #[test]
    fn test_only_location_is_emitted() {
        let target = Url::parse("http://example.com/").unwrap();
        let upstream = response(
            301,
            &[
                (LOCATION, "https://www.example.com/"),
                (SET_COOKIE, "a=1"),
                (CONTENT_TYPE, "text/html"),
            ],
        );

        let headers = redirect_headers(&upstream, &target, &proxy()).unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_not_a_redirect() {
        let target = Url::parse("http://example.com/").unwrap();
        assert!(redirect_headers(&response(200, &[(LOCATION, "/x")]), &target, &proxy()).is_none());
        assert!(redirect_headers(&response(400, &[(LOCATION, "/x")]), &target, &proxy()).is_none());
        assert!(redirect_headers(&response(304, &[]), &target, &proxy()).is_none());
        assert!(redirect_headers(&response(302, &[(LOCATION, "")]), &target, &proxy()).is_none());
    }

    #[test]
    fn test_utf8_location_is_proxied() {
        let target = Url::parse("http://example.com/").unwrap();
        let location = HeaderValue::from_bytes("/café".as_bytes()).unwrap();

        assert_eq!(
            proxied_location(&location, &target, &proxy()),
            proxy().wrap("http://example.com/caf%C3%A9").as_str()
        );
    }

    #[test]
    fn test_latin1_location_is_proxied() {
        let target = Url::parse("http://example.com/").unwrap();
        let location = HeaderValue::from_bytes(b"/caf\xe9").unwrap();

        assert_eq!(
            proxied_location(&location, &target, &proxy()),
            proxy().wrap("http://example.com/caf%C3%A9").as_str()
        );
    }

    #[test]
    fn test_unresolvable_location_kept() {
        let target = Url::parse("http://example.com/").unwrap();
        let upstream = response(307, &[(LOCATION, "http://[::1")]);

        let headers = redirect_headers(&upstream, &target, &proxy()).unwrap();
        assert_eq!(headers.get(LOCATION).unwrap(), "http://[::1");
    }
}
