//! RSS article endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use fundspace_core::{ArticlesResponse, FundspaceError};

use crate::error::ApiError;
use crate::AppState;

/// Query parameters for the RSS endpoint
#[derive(Debug, Deserialize)]
pub struct RssQuery {
    /// Category key, e.g. "general", "funder" or "nonprofit"
    pub category: Option<String>,
}

/// Create RSS routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/rss", get(get_rss).options(preflight))
}

/// GET /api/rss?category=... - Ranked articles for one category
async fn get_rss(
    State(state): State<AppState>,
    query: Result<Query<RssQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        FundspaceError::invalid_request(format!("Invalid query string: {}", rejection.body_text()))
    })?;
    let category = params.category.unwrap_or_default();
    let articles = state.pipeline.articles_for(&category).await?;

    let max_age = state.pipeline.cache().ttl().num_seconds().max(0);
    Ok((
        StatusCode::OK,
        [(header::CACHE_CONTROL, format!("public, max-age={}", max_age))],
        Json(ArticlesResponse::ok(articles)),
    ))
}

/// OPTIONS /api/rss - Plain preflight, CORS headers come from the layer
async fn preflight() -> StatusCode {
    StatusCode::OK
}
