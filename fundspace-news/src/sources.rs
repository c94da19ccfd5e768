//! Curated feed sources per category

use fundspace_core::{FeedCatalog, FeedSource};

/// Curated list of feeds served by the RSS endpoint
pub fn get_curated_sources() -> Vec<FeedSource> {
    vec![
        // Broad national coverage, no relevance filtering
        FeedSource::new(
            "general",
            &[
                "https://feeds.npr.org/1001/rss.xml",
                "https://feeds.bbci.co.uk/news/rss.xml",
                "https://www.theguardian.com/us-news/rss",
            ],
        ),
        // Foundations and grantmaking
        FeedSource::new(
            "funder",
            &[
                "https://philanthropynewsdigest.org/rss/news",
                "https://www.insidephilanthropy.com/home?format=rss",
                "https://www.sfchronicle.com/bayarea/feed/Bay-Area-News-429.php",
            ],
        )
        .community(),
        // Nonprofit sector news
        FeedSource::new(
            "nonprofit",
            &[
                "https://nonprofitquarterly.org/feed/",
                "https://www.councilofnonprofits.org/rss.xml",
                "https://www.kqed.org/news/feed",
            ],
        )
        .community(),
    ]
}

/// Catalogue built from [`get_curated_sources`]
pub fn curated_catalog() -> FeedCatalog {
    FeedCatalog::new(get_curated_sources())
}
