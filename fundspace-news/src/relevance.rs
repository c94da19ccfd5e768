//! Topical relevance filtering for community-specific categories
//!
//! An article is admitted only when it mentions both a local place and
//! philanthropy vocabulary.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use fundspace_core::Article;

/// California / Bay Area place names
pub const GEOGRAPHY_TERMS: &[&str] = &[
    "bay area",
    "san francisco",
    "oakland",
    "berkeley",
    "san jose",
    "silicon valley",
    "east bay",
    "south bay",
    "north bay",
    "peninsula",
    "marin",
    "sonoma",
    "napa",
    "alameda",
    "contra costa",
    "santa clara",
    "san mateo",
    "solano",
    "richmond",
    "fremont",
    "hayward",
    "palo alto",
    "mountain view",
    "sunnyvale",
    "santa rosa",
    "vallejo",
    "sacramento",
    "los angeles",
    "san diego",
    "fresno",
    "california",
];

/// Philanthropy and nonprofit vocabulary
pub const TOPIC_TERMS: &[&str] = &[
    "philanthrop",
    "nonprofit",
    "non-profit",
    "foundation",
    "grant",
    "funder",
    "funding",
    "donor",
    "donation",
    "charit",
    "endowment",
    "fundrais",
    "giving",
    "community fund",
    "social impact",
    "volunteer",
];

/// Outcome of both relevance checks, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceVerdict {
    pub geography: bool,
    pub topic: bool,
}

impl RelevanceVerdict {
    pub fn admitted(&self) -> bool {
        self.geography && self.topic
    }
}

/// Conjunctive keyword filter
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    /// `None` means the axis is unconstrained
    geography: Option<Regex>,
    topic: Option<Regex>,
}

impl RelevanceFilter {
    pub fn new(geography_terms: &[&str], topic_terms: &[&str]) -> Self {
        Self {
            geography: build_alternation(geography_terms),
            topic: build_alternation(topic_terms),
        }
    }

    /// Evaluate both axes for `article`
    pub fn evaluate(&self, article: &Article) -> RelevanceVerdict {
        let text = article.searchable_text();
        let matches = |re: &Option<Regex>| re.as_ref().map(|r| r.is_match(&text)).unwrap_or(true);

        let verdict = RelevanceVerdict {
            geography: matches(&self.geography),
            topic: matches(&self.topic),
        };

        if !verdict.admitted() {
            debug!(
                "Rejected '{}' (geography: {}, topic: {})",
                article.title, verdict.geography, verdict.topic
            );
        }
        verdict
    }

    pub fn admits(&self, article: &Article) -> bool {
        self.evaluate(article).admitted()
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(GEOGRAPHY_TERMS, TOPIC_TERMS)
    }
}

/// Compile terms into one case-insensitive, word-prefixed alternation
fn build_alternation(terms: &[&str]) -> Option<Regex> {
    let escaped: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();

    if escaped.is_empty() {
        return None;
    }

    RegexBuilder::new(&format!(r"\b(?:{})", escaped.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}
