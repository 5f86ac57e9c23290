//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and proxy routes
//! - Wire up middleware (request ID, tracing, timeout, concurrency, panics)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::proxy::proxy_handler;
use crate::http::response::handle_panic;
use crate::lifecycle::shutdown;
use crate::rewrite::{CookieRewriter, PatternLinkRewriter, ResponseRewriter, PROXY_ROUTE};
use crate::upstream::{Fetcher, HttpFetcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn Fetcher>,
    pub rewriter: ResponseRewriter,
    pub default_user_agent: HeaderValue,
    pub trust_forwarded_headers: bool,
}

/// HTTP server for the forward proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that fetches upstreams over the network.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let fetcher = HttpFetcher::new(&config.upstream, &config.timeouts)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a server around any `Fetcher`.
    pub fn with_fetcher(config: ProxyConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        if config.cookies.insecure_dev_mode {
            tracing::warn!(
                "cookies.insecure_dev_mode is on: Secure and SameSite=None are stripped \
                 from proxied cookies; do not use in production"
            );
        }

        let default_user_agent = HeaderValue::from_str(&config.upstream.default_user_agent)
            .unwrap_or_else(|_| {
                HeaderValue::from_static(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            });

        let state = AppState {
            fetcher,
            rewriter: ResponseRewriter::new(
                Arc::new(PatternLinkRewriter),
                CookieRewriter::new(config.cookies.insecure_dev_mode),
            ),
            default_user_agent,
            trust_forwarded_headers: config.listener.trust_forwarded_headers,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(PROXY_ROUTE, get(proxy_handler))
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TimeoutLayer::new(config.timeouts.request()))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// A handle to the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe.
async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true }))
}
