//! Set-Cookie rewriting.
//!
//! Each upstream directive is rewritten on its own; directives are never
//! joined because cookie values may contain commas. Removing `Domain`
//! binds the cookie to the proxy origin. In insecure dev mode `Secure` and
//! `SameSite=None` are removed too so the cookie survives a plain-HTTP
//! proxy.

use axum::http::HeaderValue;

/// Rewrites upstream `Set-Cookie` values for the proxy origin.
#[derive(Debug, Clone, Copy)]
pub struct CookieRewriter {
    insecure_dev_mode: bool,
}

impl CookieRewriter {
    pub fn new(insecure_dev_mode: bool) -> Self {
        Self { insecure_dev_mode }
    }

    pub fn insecure_dev_mode(&self) -> bool {
        self.insecure_dev_mode
    }

    fn drops(&self, attribute: &[u8]) -> bool {
        let attribute = attribute.trim_ascii();
        let (name, value) = match attribute.iter().position(|&b| b == b'=') {
            Some(eq) => (attribute[..eq].trim_ascii(), Some(attribute[eq + 1..].trim_ascii())),
            None => (attribute, None),
        };

        if name.eq_ignore_ascii_case(b"domain") {
            return value.is_some();
        }
        if !self.insecure_dev_mode {
            return false;
        }
        match value {
            None => name.eq_ignore_ascii_case(b"secure"),
            Some(value) => {
                name.eq_ignore_ascii_case(b"samesite") && value.eq_ignore_ascii_case(b"none")
            }
        }
    }

    /// Rewrite one raw directive.
    ///
    /// The leading `name=value` pair is never touched; kept attributes
    /// retain their original bytes, spacing and casing. Only `;` and ASCII
    /// attribute names are interpreted, so non-ASCII cookie values are safe.
    pub fn rewrite_bytes(&self, set_cookie: &[u8]) -> Vec<u8> {
        let mut parts = set_cookie.split(|&b| b == b';');
        let mut out = parts.next().unwrap_or_default().to_vec();

        for attribute in parts {
            if self.drops(attribute) {
                continue;
            }
            out.push(b';');
            out.extend_from_slice(attribute);
        }

        out
    }

    /// Rewrite one directive.
    pub fn rewrite(&self, set_cookie: &str) -> String {
        String::from_utf8_lossy(&self.rewrite_bytes(set_cookie.as_bytes())).into_owned()
    }

    /// Rewrite a header value byte-wise.
    pub fn rewrite_value(&self, value: &HeaderValue) -> HeaderValue {
        HeaderValue::from_bytes(&self.rewrite_bytes(value.as_bytes()))
            .unwrap_or_else(|_| value.clone())
    }

    /// Rewrite every directive, preserving order and count.
    pub fn rewrite_all(&self, values: &[HeaderValue]) -> Vec<HeaderValue> {
        values.iter().map(|v| self.rewrite_value(v)).collect()
    }
}

impl Default for CookieRewriter {
    fn default() -> Self {
        Self::new(true)
    }
}
