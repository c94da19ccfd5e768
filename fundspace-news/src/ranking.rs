//! Deduplication and ranking of normalized articles

use indexmap::IndexMap;

use fundspace_core::Article;

/// Keep the first article per title, order newest first, cap at `limit`.
///
/// Articles without a publication date sort after every dated article and
/// keep their relative order.
pub fn dedupe_and_rank(articles: Vec<Article>, limit: usize) -> Vec<Article> {
    let mut by_title: IndexMap<String, Article> = IndexMap::with_capacity(articles.len());
    for article in articles {
        by_title.entry(article.title.clone()).or_insert(article);
    }

    let mut ranked: Vec<Article> = by_title.into_values().collect();
    ranked.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    ranked.truncate(limit);
    ranked
}
