//! Headline client for the community news widget
//!
//! Wraps a NewsAPI-style aggregation service. Whenever the API key is
//! missing or the upstream call fails, a fixed list of articles with the
//! same shape is returned instead, so callers never see an empty feed.

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{info, instrument, warn};

use fundspace_core::Article;

use crate::error::NewsError;
use crate::normalize::{classify, parse_pub_date, strip_html, time_ago};
use crate::ranking::dedupe_and_rank;
use crate::types::{HeadlineArticle, HeadlineResponse};

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: &[&str] = &["NEWS_API_KEY", "VITE_NEWS_API_KEY"];

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_QUERY: &str = "nonprofit OR philanthropy OR foundation grant";

/// Number of headlines returned by default
pub const DEFAULT_HEADLINE_LIMIT: usize = 10;

/// Headline API client
pub struct HeadlinesClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    query: String,
    limit: usize,
}

impl HeadlinesClient {
    /// Create a client; `None` means fallback data only
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            limit: DEFAULT_HEADLINE_LIMIT,
        }
    }

    /// Read the key from [`API_KEY_VARS`]. There is no built-in default key.
    pub fn from_env() -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()));

        if api_key.is_none() {
            warn!(
                "No headline API key set ({}); serving fallback headlines",
                API_KEY_VARS.join(", ")
            );
        }
        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Latest headlines, or the fallback list. Never empty.
    #[instrument(skip(self))]
    pub async fn fetch_headlines(&self) -> Vec<Article> {
        let Some(api_key) = self.api_key.as_deref() else {
            return fallback_headlines();
        };

        match self.fetch_live(api_key).await {
            Ok(articles) if !articles.is_empty() => {
                info!("Fetched {} live headlines", articles.len());
                articles
            }
            Ok(_) => {
                warn!("Headline API returned no usable articles; serving fallback");
                fallback_headlines()
            }
            Err(e) => {
                warn!("Headline API failed: {}; serving fallback", e);
                fallback_headlines()
            }
        }
    }

    async fn fetch_live(&self, api_key: &str) -> Result<Vec<Article>, NewsError> {
        let page_size = self.limit.to_string();
        let response = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[
                ("q", self.query.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .header("X-Api-Key", api_key)
            .header("User-Agent", crate::fetcher::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: HeadlineResponse =
            serde_json::from_str(&body).map_err(|e| NewsError::ParseError(e.to_string()))?;

        if parsed.status != "ok" {
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: parsed
                    .message
                    .or(parsed.code)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(map_headlines(parsed.articles, Utc::now(), self.limit))
    }
}

/// Convert upstream headlines into articles, dropping removed/untitled ones,
/// then dedupe and rank them like feed articles
fn map_headlines(raw: Vec<HeadlineArticle>, now: DateTime<Utc>, limit: usize) -> Vec<Article> {
    let articles = raw
        .into_iter()
        .filter_map(|h| {
            let title = h.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
            if title == "[Removed]" {
                return None;
            }
            let url = h.url.clone()?;
            let description = strip_html(h.description.as_deref().unwrap_or_default());
            let pub_date = h.published_at.as_deref().and_then(parse_pub_date);

            Some(Article {
                id: url.clone(),
                title: title.to_string(),
                category: classify(title, &description).to_string(),
                summary: description,
                full_content: strip_html(h.content.as_deref().unwrap_or_default()),
                url,
                image: h.url_to_image.filter(|u| !u.trim().is_empty()),
                time_ago: time_ago(pub_date, now),
                source: h
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "News".to_string()),
                pub_date,
            })
        })
        .collect();

    dedupe_and_rank(articles, limit)
}

fn fallback(id: &str, title: &str, summary: &str, category: &str, image: &str, time_ago: &str) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        full_content: String::new(),
        url: "https://fundspace.org/news".to_string(),
        image: Some(image.to_string()),
        time_ago: time_ago.to_string(),
        category: category.to_string(),
        source: "FundSpace".to_string(),
        pub_date: None,
    }
}

/// Fixed headlines served when the live API is unavailable
pub fn fallback_headlines() -> Vec<Article> {
    vec![
        fallback(
            "fallback-1",
            "Bay Area Foundations Expand Support for Local Food Banks",
            "Regional funders announce new multi-year commitments to food security programs across the East Bay.",
            "Philanthropy",
            "https://images.unsplash.com/photo-1488521787991-ed7bbaae773c?w=800&q=80",
            "2h ago",
        ),
        fallback(
            "fallback-2",
            "Nonprofits Adopt Shared Data Tools to Measure Impact",
            "A coalition of community organizations is piloting common outcome metrics to simplify grant reporting.",
            "Nonprofit",
            "https://images.unsplash.com/photo-1559027615-cd4628902d4a?w=800&q=80",
            "5h ago",
        ),
        fallback(
            "fallback-3",
            "Community Grants Open for Youth Arts Programs",
            "Applications are now being accepted for small grants supporting after-school arts education.",
            "Philanthropy",
            "https://images.unsplash.com/photo-1460661419201-fd4cecdf8a8b?w=800&q=80",
            "1d ago",
        ),
        fallback(
            "fallback-4",
            "Volunteer Turnout Rebounds at Neighborhood Cleanups",
            "Organizers report record participation in weekend environment and park restoration events.",
            "Environment",
            "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=800&q=80",
            "2d ago",
        ),
    ]
}
