//! Error types for the news module

use thiserror::Error;

/// Errors that can occur while fetching or parsing feeds
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The per-URL fetch deadline elapsed
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Upstream returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Feed body or API response could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Response body is larger than the transport accepts
    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

impl From<reqwest::Error> for NewsError {
    fn from(err: reqwest::Error) -> Self {
        NewsError::RequestFailed(err.to_string())
    }
}
