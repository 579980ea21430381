//! Page fetching: one GET per call, bounded by a timeout, no retries.
//!
//! Timeouts, transport errors and non-success statuses all surface as a
//! [`FetchError`]; callers turn them into result text.

use async_trait::async_trait;
use siftwire_core::error::FetchError;
use std::time::Duration;
use tracing::debug;

/// Fetches a page body as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// The `reqwest`-backed fetcher used outside of tests.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!(url, timeout_secs = timeout.as_secs(), "Fetching page");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Fetch returned non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(url, timeout, e))?;
        debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        }
    } else if err.is_builder() {
        FetchError::InvalidUrl(url.to_string())
    } else if err.is_body() || err.is_decode() {
        FetchError::Body(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}
