//! HTML link rewriting.
//!
//! # Responsibilities
//! - Route `href`/`src`/`action` attribute targets through the proxy
//! - Route bare `http(s)://` URLs anywhere in the text through the proxy
//!
//! # Design Decisions
//! - Pattern matching, not a DOM parse. URLs inside scripts, styles or
//!   malformed markup may be missed or rewritten imperfectly.
//! - Attribute pass runs first; the bare-URL pass skips anything already
//!   carrying the proxy prefix, so nothing is wrapped twice.
//! - A value that fails to resolve is left exactly as written.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use crate::rewrite::proxy_url::ProxyBase;

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?P<attr>href|src|action)=(?P<open>["'])(?P<url>[^"']+)(?P<close>["'])"#)
        .expect("attribute pattern compiles")
});

static BARE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+"#)
        .expect("bare url pattern compiles")
});

/// Schemes and fragments that never leave the page.
const INERT_PREFIXES: [&str; 4] = ["data:", "mailto:", "javascript:", "#"];

/// Strategy for routing the links of an HTML document through the proxy.
pub trait LinkRewriter: Send + Sync {
    fn rewrite(&self, html: &str, base: &Url, proxy: &ProxyBase) -> String;
}

/// Two-pass, regex-based `LinkRewriter`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternLinkRewriter;

fn is_inert(value: &str) -> bool {
    INERT_PREFIXES.iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

impl PatternLinkRewriter {
    /// Rewrite attribute values. Returns the new text and the number of
    /// values rewritten.
    pub fn rewrite_attributes(&self, html: &str, base: &Url, proxy: &ProxyBase) -> (String, usize) {
        let mut rewritten = 0;
        let text = ATTRIBUTE_PATTERN.replace_all(html, |caps: &Captures| {
            let value = &caps["url"];
            if is_inert(value) || proxy.is_proxied(value) {
                return caps[0].to_string();
            }
            match proxy.resolve_and_wrap(value, base) {
                Some(wrapped) => {
                    rewritten += 1;
                    format!("{}={}{}{}", &caps["attr"], &caps["open"], wrapped, &caps["close"])
                }
                None => {
                    tracing::trace!(value, "Attribute value did not resolve; left as-is");
                    caps[0].to_string()
                }
            }
        });
        (text.into_owned(), rewritten)
    }

    /// Wrap bare absolute URLs. Returns the new text and the number of
    /// URLs wrapped.
    pub fn rewrite_bare_urls(&self, text: &str, proxy: &ProxyBase) -> (String, usize) {
        let mut rewritten = 0;
        let text = BARE_URL_PATTERN.replace_all(text, |caps: &Captures| {
            let found = &caps[0];
            if proxy.is_proxied(found) {
                found.to_string()
            } else {
                rewritten += 1;
                proxy.wrap(found)
            }
        });
        (text.into_owned(), rewritten)
    }
}

impl LinkRewriter for PatternLinkRewriter {
    fn rewrite(&self, html: &str, base: &Url, proxy: &ProxyBase) -> String {
        let (text, attributes) = self.rewrite_attributes(html, base, proxy);
        let (text, bare) = self.rewrite_bare_urls(&text, proxy);
        crate::observability::metrics::record_links_rewritten(attributes + bare);
        text
    }
}
