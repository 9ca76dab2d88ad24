//! Fetching raw files from the remote service.
//!
//! [`Fetcher`] is the seam between the download engine and the network. The
//! engine only needs to tell "here are the bytes" from "this day does not
//! exist" and "something went wrong".

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{DownloadError, Result};

/// Answer to a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResponse {
    Success(Bytes),
    /// The remote has no file for this URL.
    NotFound,
    /// Transport failure or unexpected status, after any retries.
    Error(String),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`. Never panics or returns early on failure; every failure
    /// is a non-success response.
    async fn fetch(&self, url: &str) -> FetchResponse;
}

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(15),
            user_agent: format!("imddaily/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Fetcher backed by reqwest with exponential backoff.
///
/// Transport errors and 5xx responses are retried. A 404 is an answer, not a
/// failure, and is returned immediately.
pub struct HttpFetcher {
    client: Client,
    config: HttpConfig,
}

enum Attempt {
    Done(FetchResponse),
    Retry(String),
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| DownloadError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(format!("request failed: {e}")),
        };

        match response.status() {
            StatusCode::NOT_FOUND => Attempt::Done(FetchResponse::NotFound),
            status if status.is_success() => match response.bytes().await {
                Ok(body) => Attempt::Done(FetchResponse::Success(body)),
                Err(e) => Attempt::Retry(format!("error reading body: {e}")),
            },
            status if status.is_server_error() => Attempt::Retry(format!("HTTP {status}")),
            status => Attempt::Done(FetchResponse::Error(format!("HTTP {status}"))),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResponse {
        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.attempt(url).await {
                Attempt::Done(response) => {
                    debug!(url, retries = retry_count, "Fetch finished");
                    return response;
                }
                Attempt::Retry(reason) => {
                    if retry_count >= self.config.max_retries {
                        return FetchResponse::Error(format!(
                            "{reason} (after {} retries)",
                            retry_count
                        ));
                    }
                    retry_count += 1;

                    warn!(
                        url,
                        error = %reason,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
            }
        }
    }
}
