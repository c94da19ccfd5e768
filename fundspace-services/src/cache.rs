//! Response cache
//!
//! In-memory, category-keyed store with a single TTL. Entries are immutable
//! and swapped in whole, so a reader sees either the old entry or the new
//! one, never a mix. Expired entries are ignored on read and overwritten by
//! the next successful pipeline run; nothing is evicted proactively.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use fundspace_core::Article;

/// Default time an entry stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of "now" for cache freshness and relative timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct ManualClock {
    now: parking_lot::Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: parking_lot::Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A cached pipeline result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// Category-keyed response cache
pub struct ResponseCache {
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    /// Cache on the wall clock with the default TTL
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CACHE_TTL, Arc::new(SystemClock))
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Articles for `category` if a fresh entry exists
    pub fn get(&self, category: &str) -> Option<Vec<Article>> {
        let entry = self.entries.read().get(category).cloned()?;
        let age = self.clock.now() - entry.timestamp;

        if age < self.ttl {
            debug!(
                "Cache HIT for '{}' ({} articles, age {}s)",
                category,
                entry.articles.len(),
                age.num_seconds()
            );
            Some(entry.articles.clone())
        } else {
            debug!("Cache STALE for '{}'", category);
            None
        }
    }

    /// Replace the entry for `category`, stamped with the current time
    pub fn put(&self, category: &str, articles: Vec<Article>) {
        let entry = Arc::new(CacheEntry {
            timestamp: self.clock.now(),
            articles,
        });
        self.entries.write().insert(category.to_string(), entry);
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(title: &str) -> Article {
        Article {
            id: title.to_string(),
            title: title.to_string(),
            summary: String::new(),
            full_content: String::new(),
            url: String::new(),
            image: None,
            time_ago: "Recently".to_string(),
            category: "general".to_string(),
            source: String::new(),
            pub_date: None,
        }
    }

    fn setup() -> (Arc<ManualClock>, ResponseCache) {
        let t0 = Utc.with_ymd_and_hms(2025, 10, 6, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(t0));
        let cache = ResponseCache::new(DEFAULT_CACHE_TTL, clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_empty_cache_misses() {
        let (_, cache) = setup();
        assert!(cache.get("general").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_boundary() {
        let (clock, cache) = setup();
        let written_at = clock.now();
        cache.put("funder", vec![article("a")]);

        clock.set(written_at + cache.ttl() - chrono::Duration::milliseconds(1));
        assert_eq!(cache.get("funder").unwrap().len(), 1);

        clock.set(written_at + cache.ttl());
        assert!(cache.get("funder").is_none());

        clock.set(written_at + cache.ttl() + chrono::Duration::milliseconds(1));
        assert!(cache.get("funder").is_none());
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let (clock, cache) = setup();
        cache.put("general", vec![article("old")]);

        clock.advance(chrono::Duration::minutes(10));
        assert!(cache.get("general").is_none());

        cache.put("general", vec![article("new"), article("newer")]);
        let articles = cache.get("general").unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_categories_are_independent() {
        let (_, cache) = setup();
        cache.put("general", vec![article("g")]);
        assert!(cache.get("funder").is_none());
        assert_eq!(cache.get("general").unwrap()[0].title, "g");

        cache.clear();
        assert!(cache.get("general").is_none());
    }
}
