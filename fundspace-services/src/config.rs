//! Pipeline configuration loaded from the environment

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::DEFAULT_CACHE_TTL;
use fundspace_news::DEFAULT_FETCH_TIMEOUT;

/// Articles returned per category by default
pub const DEFAULT_RESULT_LIMIT: usize = 6;

/// What to do with an article when no image could be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingImagePolicy {
    /// Drop the article
    Exclude,
    /// Substitute the category stock image
    #[default]
    CategoryFallback,
}

impl FromStr for MissingImagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "fallback" | "category-fallback" | "category_fallback" => Ok(Self::CategoryFallback),
            other => Err(format!("unknown missing-image policy '{}'", other)),
        }
    }
}

impl fmt::Display for MissingImagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::CategoryFallback => write!(f, "category-fallback"),
        }
    }
}

/// Configuration for [`crate::FeedPipeline`]
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How long a category result is served from cache
    pub cache_ttl: Duration,
    /// Deadline for each individual feed request
    pub fetch_timeout: Duration,
    /// Maximum articles per category response
    pub result_limit: usize,
    pub missing_image: MissingImagePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            result_limit: DEFAULT_RESULT_LIMIT,
            missing_image: MissingImagePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from `RSS_CACHE_TTL_SECS`, `RSS_FETCH_TIMEOUT_SECS`,
    /// `RSS_RESULT_LIMIT` and `RSS_MISSING_IMAGE_POLICY`.
    ///
    /// Unset variables keep their defaults; invalid ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cache_ttl = parse_var(&lookup, "RSS_CACHE_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let fetch_timeout = parse_var(&lookup, "RSS_FETCH_TIMEOUT_SECS")
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);

        let result_limit = parse_var(&lookup, "RSS_RESULT_LIMIT")
            .filter(|limit: &usize| *limit > 0)
            .unwrap_or(defaults.result_limit);

        let missing_image =
            parse_var(&lookup, "RSS_MISSING_IMAGE_POLICY").unwrap_or(defaults.missing_image);

        Self {
            cache_ttl,
            fetch_timeout,
            result_limit,
            missing_image,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring invalid {}='{}': {}", key, raw, e);
            None
        }
    }
}
