//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Issue one GET per proxied request (no retries)
//! - Never follow redirects; surface 3xx as-is
//! - Bound connect time, total time and buffered body size
//!
//! # Design Decisions
//! - `Fetcher` is a trait so the dispatcher can run against test doubles
//! - The reqwest client is shared; its pool is invisible to callers
//! - Dropping the returned future abandons the upstream request

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::header::USER_AGENT;
use reqwest::{redirect, Client};

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::upstream::headers::HeaderList;
use crate::upstream::types::{FetchError, FetchRequest, FetchResult, UpstreamResponse};

/// Something that can retrieve a target URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> FetchResult<UpstreamResponse>;
}

/// `Fetcher` backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(timeouts.connect())
            .timeout(timeouts.upstream())
            .build()?;

        Ok(Self {
            client,
            timeout: timeouts.upstream(),
            max_body_bytes: upstream.max_body_bytes,
        })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(error)
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> FetchResult<UpstreamResponse> {
        let limit = self.max_body_bytes;
        let mut response = self
            .client
            .get(request.target)
            .header(USER_AGENT, request.user_agent)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::BodyTooLarge { limit });
        }

        let status = response.status();
        let headers = HeaderList::from(response.headers());

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::BodyTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::trace!(status = %status, bytes = body.len(), "Upstream body buffered");

        Ok(UpstreamResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}
