//! Feed source configuration types

use serde::{Deserialize, Serialize};

/// A named category mapped to an ordered list of feed URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    /// Category key used in requests (e.g. "funder")
    pub category: String,
    /// Feed URLs, fetched concurrently but reported in this order
    pub urls: Vec<String>,
    /// Community-specific categories go through the relevance filter
    #[serde(default)]
    pub community: bool,
}

impl FeedSource {
    pub fn new(category: &str, urls: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            urls: urls.iter().map(|s| s.to_string()).collect(),
            community: false,
        }
    }

    /// Mark this source as community-specific
    pub fn community(mut self) -> Self {
        self.community = true;
        self
    }
}

/// Static category → feed source lookup
#[derive(Debug, Clone, Default)]
pub struct FeedCatalog {
    sources: Vec<FeedSource>,
}

impl FeedCatalog {
    pub fn new(sources: Vec<FeedSource>) -> Self {
        Self { sources }
    }

    /// Find a source by category key (exact, case-sensitive)
    pub fn get(&self, category: &str) -> Option<&FeedSource> {
        self.sources.iter().find(|s| s.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
