//! Concurrent feed fetching
//!
//! Every URL of a category is fetched at the same time with its own
//! deadline. A URL that fails, times out, or returns something that does
//! not parse as a feed simply contributes nothing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::NewsError;
use crate::feed::{parse_feed, ParsedFeed};

/// Identifying user agent sent to feed hosts
pub const USER_AGENT: &str = "FundSpace-RSS/1.0 (+https://fundspace.org)";

/// Accept header for feed requests
pub const FEED_ACCEPT: &str =
    "application/rss+xml, application/atom+xml, application/xml, text/xml;q=0.9, */*;q=0.8";

/// Default per-URL deadline
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest feed body read into memory
pub const MAX_FEED_BYTES: usize = 5 * 1024 * 1024;

/// Raw byte transport for feed bodies
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, NewsError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    max_body_bytes: usize,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            max_body_bytes: MAX_FEED_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, NewsError> {
        let mut response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", FEED_ACCEPT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }

        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(NewsError::TooLarge { limit });
        }

        // Content-Length may be absent or wrong, so the stream is capped too
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(NewsError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// A feed that was fetched and parsed successfully
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub url: String,
    pub feed: ParsedFeed,
}

/// Fans out over a category's URLs and collects whatever succeeds
pub struct FeedFetcher {
    transport: Arc<dyn FeedTransport>,
    timeout: Duration,
}

impl FeedFetcher {
    pub fn new(transport: Arc<dyn FeedTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Fetcher using the HTTP transport with matching client timeout
    pub fn http(timeout: Duration) -> Self {
        Self::new(Arc::new(HttpTransport::new(timeout)), timeout)
    }

    /// Fetch all URLs concurrently; results keep the input order
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<FetchedFeed> {
        let results = join_all(urls.iter().map(|url| self.fetch_one(url))).await;

        let fetched: Vec<FetchedFeed> = urls
            .iter()
            .zip(results)
            .filter_map(|(url, result)| match result {
                Ok(feed) => {
                    debug!("Fetched {} items from {}", feed.items.len(), url);
                    Some(FetchedFeed {
                        url: url.clone(),
                        feed,
                    })
                }
                Err(e) => {
                    warn!("Failed to fetch feed {}: {}", url, e);
                    None
                }
            })
            .collect();

        info!("Fetched {}/{} feeds", fetched.len(), urls.len());
        fetched
    }

    async fn fetch_one(&self, url: &str) -> Result<ParsedFeed, NewsError> {
        let body = tokio::time::timeout(self.timeout, self.transport.get(url))
            .await
            .map_err(|_| NewsError::Timeout(self.timeout.as_millis() as u64))??;

        parse_feed(&body)
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod mock {
    //! Canned transport for tests

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// How the mock answers a URL
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        Body(Vec<u8>),
        Status(u16),
        /// Never answers within any reasonable deadline
        Hang,
    }

    #[derive(Default)]
    pub struct MockTransport {
        responses: HashMap<String, MockResponse>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, response: MockResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        pub fn with_body(self, url: &str, body: &str) -> Self {
            self.with(url, MockResponse::Body(body.as_bytes().to_vec()))
        }

        /// Number of outbound requests made so far
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedTransport for MockTransport {
        async fn get(&self, url: &str) -> Result<Vec<u8>, NewsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(url) {
                Some(MockResponse::Body(body)) => Ok(body.clone()),
                Some(MockResponse::Status(status)) => Err(NewsError::ApiError {
                    status: *status,
                    message: format!("Failed to fetch {}", url),
                }),
                Some(MockResponse::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(NewsError::RequestFailed("hung".to_string()))
                }
                None => Err(NewsError::RequestFailed(format!("no route to {}", url))),
            }
        }
    }
}
