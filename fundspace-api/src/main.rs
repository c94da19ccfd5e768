//! FundSpace News API Server
//!
//! Serves categorized RSS articles and community headlines to the frontend.

mod config;
mod error;
mod routes;

use std::sync::Arc;

use std::any::Any as PanicPayload;

use axum::{
    http::{header, Method},
    response::{IntoResponse, Response},
    Router,
};
use fundspace_core::FundspaceError;
use fundspace_news::HeadlinesClient;
use fundspace_services::{FeedPipeline, PipelineConfig};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FeedPipeline>,
    pub headlines: Arc<HeadlinesClient>,
}

/// Build the router with CORS and request tracing
pub fn app(state: AppState) -> Router {
    with_layers(Router::new().nest("/api", routes::api_routes()), state)
}

fn with_layers(router: Router<AppState>, state: AppState) -> Router {
    // Public read-only API, any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// A panicking handler answers with the generic 500 envelope
fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ApiError::from(FundspaceError::internal(format!("handler panicked: {}", detail))).into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fundspace_api=debug")),
        )
        .init();

    info!("Starting FundSpace News API");

    let pipeline_config = PipelineConfig::from_env();
    info!(
        "Pipeline: cache TTL {}s, fetch timeout {}s, limit {}",
        pipeline_config.cache_ttl.as_secs(),
        pipeline_config.fetch_timeout.as_secs(),
        pipeline_config.result_limit
    );
    let pipeline = Arc::new(FeedPipeline::from_config(pipeline_config));

    // NEWS_API_KEY is optional - fallback headlines are served without it
    let headlines = Arc::new(HeadlinesClient::from_env());
    if headlines.is_configured() {
        info!("Headline API key found");
    }

    let state = AppState {
        pipeline,
        headlines,
    };

    let server = ServerConfig::from_env();
    let addr = server.addr();
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
