//! Embedding forward proxy library.
//!
//! Fetches a caller-named URL, strips what would stop it rendering inside
//! a cross-origin iframe, rewrites cookies for the proxy origin, and routes
//! every link in HTML back through `/proxy`.

// Request pipeline
pub mod http;
pub mod rewrite;
pub mod upstream;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
