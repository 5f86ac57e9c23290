//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! FetchRequest (target Url + User-Agent)
//!     → client.rs (reqwest GET, redirects disabled, bounded body)
//!     → UpstreamResponse (status, HeaderList, buffered body)
//!     → rewrite subsystem
//! ```

pub mod client;
pub mod headers;
pub mod types;

pub use client::{Fetcher, HttpFetcher};
pub use headers::HeaderList;
pub use types::{FetchError, FetchRequest, FetchResult, UpstreamResponse};
