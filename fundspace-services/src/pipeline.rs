//! Feed pipeline
//!
//! Turns a category key into a ranked list of articles: fetch every feed for
//! the category, resolve images, normalize, filter community categories by
//! relevance, then dedupe, rank and cache the result.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use fundspace_core::{Article, FeedCatalog, FeedSource, FundspaceError, FundspaceResult};
use fundspace_news::{
    curated_catalog, dedupe_and_rank, fallback_image, normalize, resolve_image, FeedFetcher,
    FetchedFeed, RelevanceFilter,
};

use crate::cache::{ResponseCache, SystemClock};
use crate::config::{MissingImagePolicy, PipelineConfig};

/// Per-run counters, logged once per pipeline run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub feeds_ok: usize,
    pub items: usize,
    pub missing_image: usize,
    pub rejected_geography: usize,
    pub rejected_topic: usize,
    pub returned: usize,
}

/// The category-keyed article pipeline.
///
/// Runs for the same category are not serialized: two concurrent cache
/// misses both fetch, and whichever finishes last owns the cache entry.
pub struct FeedPipeline {
    catalog: FeedCatalog,
    fetcher: FeedFetcher,
    cache: Arc<ResponseCache>,
    relevance: RelevanceFilter,
    config: PipelineConfig,
}

impl FeedPipeline {
    pub fn new(
        catalog: FeedCatalog,
        fetcher: FeedFetcher,
        cache: Arc<ResponseCache>,
        config: PipelineConfig,
    ) -> Self {
        info!(
            "Initializing FeedPipeline ({} categories, limit {}, missing images: {})",
            catalog.len(),
            config.result_limit,
            config.missing_image
        );
        Self {
            catalog,
            fetcher,
            cache,
            relevance: RelevanceFilter::default(),
            config,
        }
    }

    /// Curated catalog over HTTP with the wall clock
    pub fn from_config(config: PipelineConfig) -> Self {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl, Arc::new(SystemClock)));
        let fetcher = FeedFetcher::http(config.fetch_timeout);
        Self::new(curated_catalog(), fetcher, cache, config)
    }

    pub fn with_relevance(mut self, relevance: RelevanceFilter) -> Self {
        self.relevance = relevance;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn catalog(&self) -> &FeedCatalog {
        &self.catalog
    }

    /// Articles for `category`, from cache when fresh.
    ///
    /// Unreachable or unparseable feeds are skipped; the only errors are a
    /// blank or unknown category.
    #[instrument(skip(self))]
    pub async fn articles_for(&self, category: &str) -> FundspaceResult<Vec<Article>> {
        let category = category.trim();
        if category.is_empty() {
            return Err(FundspaceError::invalid_request(
                "Category parameter is required",
            ));
        }

        let source = self
            .catalog
            .get(category)
            .ok_or_else(|| FundspaceError::invalid_request("Invalid category"))?;

        if let Some(articles) = self.cache.get(category) {
            return Ok(articles);
        }
        debug!("Cache MISS for '{}'", category);

        let fetched = self.fetcher.fetch_all(&source.urls).await;
        let (articles, stats) = self.build(source, fetched);

        info!(
            "Category '{}': {}/{} feeds, {} items, {} without image, {} off-region, {} off-topic, {} returned",
            category,
            stats.feeds_ok,
            source.urls.len(),
            stats.items,
            stats.missing_image,
            stats.rejected_geography,
            stats.rejected_topic,
            stats.returned
        );

        self.cache.put(category, articles.clone());
        Ok(articles)
    }

    fn build(&self, source: &FeedSource, fetched: Vec<FetchedFeed>) -> (Vec<Article>, PipelineStats) {
        let now = self.cache.now();
        let mut stats = PipelineStats {
            feeds_ok: fetched.len(),
            ..PipelineStats::default()
        };
        let mut articles = Vec::new();

        for FetchedFeed { url, feed } in fetched {
            for item in &feed.items {
                stats.items += 1;

                let image = match resolve_image(item, &url) {
                    Some(image) => image,
                    None => {
                        stats.missing_image += 1;
                        match self.config.missing_image {
                            MissingImagePolicy::Exclude => continue,
                            MissingImagePolicy::CategoryFallback => {
                                fallback_image(&source.category).to_string()
                            }
                        }
                    }
                };

                let article = normalize(item, Some(image), &url, feed.title.as_deref(), now);

                if source.community {
                    let verdict = self.relevance.evaluate(&article);
                    if !verdict.geography {
                        stats.rejected_geography += 1;
                    }
                    if !verdict.topic {
                        stats.rejected_topic += 1;
                    }
                    if !verdict.admitted() {
                        continue;
                    }
                }

                articles.push(article);
            }
        }

        let ranked = dedupe_and_rank(articles, self.config.result_limit);
        stats.returned = ranked.len();
        (ranked, stats)
    }
}
