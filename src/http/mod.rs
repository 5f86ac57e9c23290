//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (url parameter, proxy base, User-Agent, request ID)
//!     → proxy.rs (validate → fetch → rewrite)
//!     → response.rs (status/headers/body, error mapping)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ProxyQuery, X_REQUEST_ID};
pub use response::{ProxyError, PROXY_ERROR_BODY};
pub use server::{AppState, HttpServer};
