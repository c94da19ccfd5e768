//! Wire types for the third-party headline API

use serde::Deserialize;

/// `GET /v2/everything` response
#[derive(Debug, Deserialize)]
pub struct HeadlineResponse {
    /// "ok" or "error"
    pub status: String,
    /// Total number of matches upstream
    #[serde(rename = "totalResults", default)]
    pub total_results: usize,
    #[serde(default)]
    pub articles: Vec<HeadlineArticle>,
    /// Error code when `status == "error"`
    pub code: Option<String>,
    /// Error message when `status == "error"`
    pub message: Option<String>,
}

/// Publisher reference attached to each headline
#[derive(Debug, Deserialize)]
pub struct HeadlineSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A single headline
#[derive(Debug, Deserialize)]
pub struct HeadlineArticle {
    pub source: Option<HeadlineSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Image URL
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    /// Publication date (ISO 8601)
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
}
