//! Article data structures produced by the ingestion pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in an article summary
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Canonical article record returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Identifier derived from guid or link
    pub id: String,
    /// Trimmed article title
    pub title: String,
    /// Plain-text excerpt, at most 200 characters plus ellipsis
    pub summary: String,
    /// Raw content used for relevance filtering (never serialized)
    #[serde(skip)]
    pub full_content: String,
    /// Link to the source article
    pub url: String,
    /// Representative image URL
    pub image: Option<String>,
    /// Human-relative publication time, fixed when the response is built
    pub time_ago: String,
    /// Feed title or derived topical label
    pub category: String,
    /// Origin feed URL
    pub source: String,
    /// Publication date, only used for ranking
    #[serde(skip)]
    pub pub_date: Option<DateTime<Utc>>,
}

impl Article {
    /// Text the relevance filter matches against
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.full_content)
    }
}

/// JSON envelope shared by the article endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlesResponse {
    pub success: bool,
    pub articles: Vec<Article>,
}

impl ArticlesResponse {
    pub fn ok(articles: Vec<Article>) -> Self {
        Self {
            success: true,
            articles,
        }
    }
}

/// JSON envelope for failed requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
