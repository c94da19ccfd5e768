//! Feed ingestion for FundSpace
//!
//! This crate provides:
//! - Concurrent, failure-tolerant RSS/Atom fetching and parsing
//! - Image resolution across feed extensions and HTML bodies
//! - Normalization of feed items into [`fundspace_core::Article`]s
//! - Keyword relevance filtering for community categories
//! - Title deduplication and recency ranking
//! - A headline client with built-in fallback content

pub mod error;
pub mod feed;
pub mod fetcher;
pub mod headlines;
pub mod image;
pub mod normalize;
pub mod ranking;
pub mod relevance;
pub mod sources;
pub mod types;

pub use error::NewsError;
pub use feed::{parse_feed, Enclosure, MediaRef, ParsedFeed, RawFeedItem};
pub use fetcher::{
    FeedFetcher, FeedTransport, FetchedFeed, HttpTransport, DEFAULT_FETCH_TIMEOUT,
    MAX_FEED_BYTES,
};
pub use headlines::{fallback_headlines, HeadlinesClient};
pub use image::{extract_image_from_html, fallback_image, resolve_image};
pub use normalize::normalize;
pub use ranking::dedupe_and_rank;
pub use relevance::{RelevanceFilter, RelevanceVerdict};
pub use sources::{curated_catalog, get_curated_sources};
