//! Service layer for FundSpace news
//!
//! This crate wires the ingestion pieces from `fundspace-news` into a single
//! category-keyed pipeline backed by an in-memory response cache.

pub mod cache;
pub mod config;
pub mod pipeline;

#[cfg(any(test, feature = "testing"))]
pub use cache::ManualClock;
pub use cache::{CacheEntry, Clock, ResponseCache, SystemClock, DEFAULT_CACHE_TTL};
pub use config::{MissingImagePolicy, PipelineConfig, DEFAULT_RESULT_LIMIT};
pub use pipeline::{FeedPipeline, PipelineStats};
pub use fundspace_news::dedupe_and_rank;
