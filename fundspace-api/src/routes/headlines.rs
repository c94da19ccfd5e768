//! Community headline endpoint

use axum::{extract::State, routing::get, Json, Router};

use fundspace_core::ArticlesResponse;

use crate::AppState;

/// Create headline routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/headlines", get(get_headlines))
}

/// GET /api/headlines - Live headlines, or the built-in list when the
/// upstream API is unavailable
async fn get_headlines(State(state): State<AppState>) -> Json<ArticlesResponse> {
    Json(ArticlesResponse::ok(state.headlines.fetch_headlines().await))
}
