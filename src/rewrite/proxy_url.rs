//! Proxied URL construction.
//!
//! A proxied URL is `<proxy base>/proxy?url=<component-encoded target>`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Path of the proxy route; shared with the router.
pub const PROXY_ROUTE: &str = "/proxy";

/// Characters left as-is when encoding a target into the query string.
/// Matches URI component encoding: alphanumerics plus `-_.!~*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Scheme and host the inbound request arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyBase {
    origin: String,
    prefix: String,
}

impl ProxyBase {
    pub fn new(scheme: &str, host: &str) -> Self {
        let origin = format!("{}://{}", scheme, host);
        let prefix = format!("{}{}?url=", origin, PROXY_ROUTE);
        Self { origin, prefix }
    }

    /// `scheme://host`, without a trailing slash.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `scheme://host/proxy?url=`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `link` already routes through this proxy.
    pub fn is_proxied(&self, link: &str) -> bool {
        link.starts_with(&self.prefix)
    }

    /// Wrap an absolute URL so it routes back through this proxy.
    pub fn wrap(&self, absolute: &str) -> String {
        format!("{}{}", self.prefix, utf8_percent_encode(absolute, COMPONENT))
    }

    /// Resolve `link` against `base` and wrap the result.
    ///
    /// Returns `None` when the link cannot be resolved.
    pub fn resolve_and_wrap(&self, link: &str, base: &Url) -> Option<String> {
        base.join(link).ok().map(|absolute| self.wrap(absolute.as_str()))
    }
}
