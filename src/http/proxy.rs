//! `GET /proxy` dispatcher.
//!
//! Validates the target, fetches it once, and hands the upstream response
//! to the rewriter. Nothing is retried and nothing is cached.

use std::time::Instant;

use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::http::request::{request_id, upstream_user_agent, ProxyQuery};
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::rewrite::{ProxiedResponse, ProxyBase};
use crate::upstream::{FetchError, FetchRequest};

pub async fn proxy_handler(
    State(state): State<AppState>,
    proxy: ProxyBase,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let query = ProxyQuery::parse(query.as_deref());

    match forward(&state, &proxy, query, &headers).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status,
                kind = %response.kind,
                latency_ms = start.elapsed().as_millis() as u64,
                "Proxied response"
            );
            metrics::record_request(response.kind.as_str(), response.status.as_u16(), start);
            response.into_response()
        }
        Err(error) => {
            match &error {
                ProxyError::Fetch(cause) => {
                    tracing::error!(request_id = %request_id, error = %cause, "Upstream fetch failed");
                }
                other => {
                    tracing::warn!(request_id = %request_id, error = %other, "Rejected proxy request");
                }
            }
            metrics::record_request(error.kind(), error.status().as_u16(), start);
            error.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    proxy: &ProxyBase,
    query: ProxyQuery,
    headers: &HeaderMap,
) -> Result<ProxiedResponse, ProxyError> {
    let raw = query.target().ok_or(ProxyError::MissingUrl)?;
    let target = Url::parse(&raw).map_err(|source| FetchError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;

    tracing::debug!(target = %target, proxy_base = %proxy.origin(), "Fetching upstream");

    let upstream = state
        .fetcher
        .fetch(FetchRequest {
            target: target.clone(),
            user_agent: upstream_user_agent(headers, &state.default_user_agent),
        })
        .await?;

    Ok(state.rewriter.rewrite(upstream, &target, proxy))
}
