//! API route definitions

mod headlines;
mod health;
mod rss;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(rss::routes())
        .merge(headlines::routes())
        .merge(health::routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{body::Body, http::Request, response::Response, Router};
    use tower::ServiceExt;

    use fundspace_core::{FeedCatalog, FeedSource};
    use fundspace_news::fetcher::mock::MockTransport;
    use fundspace_news::{FeedFetcher, HeadlinesClient};
    use fundspace_services::{FeedPipeline, PipelineConfig, ResponseCache, SystemClock};

    use crate::AppState;

    pub const FEED_URL: &str = "https://news.example/rss";

    pub const FEED: &str = r#"<?xml version="1.0"?>
        <rss version="2.0">
          <channel>
            <title>Example News</title>
            <item>
              <title>San Jose nonprofit launches tutoring grant</title>
              <link>https://news.example/a</link>
              <description>&lt;p&gt;&lt;img src="https://news.example/a.png"&gt; Funding for Bay Area schools.&lt;/p&gt;</description>
              <pubDate>Mon, 06 Oct 2025 09:00:00 GMT</pubDate>
            </item>
          </channel>
        </rss>"#;

    /// State with "general", "funder" and "empty" categories served from `transport`
    pub fn state(transport: Arc<MockTransport>) -> AppState {
        let config = PipelineConfig {
            fetch_timeout: Duration::from_millis(200),
            ..PipelineConfig::default()
        };
        let catalog = FeedCatalog::new(vec![
            FeedSource::new("general", &[FEED_URL]),
            FeedSource::new("funder", &[FEED_URL]).community(),
            FeedSource::new("empty", &[]),
        ]);
        let cache = Arc::new(ResponseCache::new(config.cache_ttl, Arc::new(SystemClock)));
        let fetcher = FeedFetcher::new(transport, config.fetch_timeout);

        AppState {
            pipeline: Arc::new(FeedPipeline::new(catalog, fetcher, cache, config)),
            headlines: Arc::new(HeadlinesClient::new(None)),
        }
    }

    pub fn app(transport: Arc<MockTransport>) -> Router {
        crate::app(state(transport))
    }

    pub async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    pub async fn get(app: Router, uri: &str) -> Response {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
