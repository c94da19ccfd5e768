//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    categories: usize,
    cached_categories: usize,
    headlines_configured: bool,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy",
        categories: state.pipeline.catalog().len(),
        cached_categories: state.pipeline.cache().len(),
        headlines_configured: state.headlines.is_configured(),
    };

    (StatusCode::OK, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fundspace_news::fetcher::mock::MockTransport;

    use super::*;
    use crate::routes::test_support::{app, get, json, FEED, FEED_URL};

    #[tokio::test]
    async fn test_liveness() {
        let response = get(app(Arc::new(MockTransport::new())), "/api/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_health_counts_cached_categories() {
        let app = app(Arc::new(MockTransport::new().with_body(FEED_URL, FEED)));

        let body = json(get(app.clone(), "/api/health").await).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["categories"], 3);
        assert_eq!(body["cachedCategories"], 0);
        assert_eq!(body["headlinesConfigured"], false);

        get(app.clone(), "/api/rss?category=general").await;
        let body = json(get(app, "/api/health").await).await;
        assert_eq!(body["cachedCategories"], 1);
    }
}
