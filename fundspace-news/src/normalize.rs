//! Mapping raw feed items onto the canonical [`Article`] record

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use fundspace_core::{Article, SUMMARY_MAX_CHARS};

use crate::feed::{html_entity_codepoint, RawFeedItem};

/// Placeholder title for items that declare none
pub const UNTITLED: &str = "No Title";

/// Label used when neither the feed nor the classifier names a category
pub const DEFAULT_CATEGORY: &str = "Breaking News";

/// Keyword → label table, checked in order
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("philanthrop", "Philanthropy"),
    ("nonprofit", "Nonprofit"),
    ("tech", "Technology"),
    ("business", "Business"),
    ("health", "Health"),
    ("environment", "Environment"),
];

/// Build an [`Article`] from a raw item.
///
/// `now` is taken as a parameter so the relative timestamp is reproducible:
/// the same item and the same `now` always produce the same article.
pub fn normalize(
    item: &RawFeedItem,
    image: Option<String>,
    source: &str,
    feed_title: Option<&str>,
    now: DateTime<Utc>,
) -> Article {
    let title = item
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let pub_date = item.pub_date.as_deref().and_then(parse_pub_date);

    let snippet_html = item
        .content_snippet
        .as_deref()
        .or(item.content.as_deref())
        .unwrap_or_default();
    let snippet = strip_html(snippet_html);

    let full_content = item
        .html_bodies()
        .map(strip_html)
        .collect::<Vec<_>>()
        .join(" ");

    let category = feed_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| classify(&title, &snippet).to_string());

    Article {
        id: article_id(item, &title),
        title,
        summary: truncate_summary(&snippet),
        full_content,
        url: item.link.clone().unwrap_or_default(),
        image,
        time_ago: time_ago(pub_date, now),
        category,
        source: source.to_string(),
        pub_date,
    }
}

/// guid, then link, then a stable hash of title and date
fn article_id(item: &RawFeedItem, title: &str) -> String {
    if let Some(id) = item.guid.as_ref().or(item.link.as_ref()) {
        return id.clone();
    }

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"|");
    hasher.update(item.pub_date.as_deref().unwrap_or_default().as_bytes());
    format!("item-{}", hex::encode(&hasher.finalize()[..8]))
}

/// Render a publication date relative to `now`
pub fn time_ago(pub_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(date) = pub_date else {
        return "Recently".to_string();
    };

    let hours = (now - date).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    }
}

/// Parse the date formats seen in the wild; `None` when nothing fits
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Keyword classifier over title and description
pub fn classify(title: &str, description: &str) -> &'static str {
    let text = format!("{} {}", title, description).to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_CATEGORY)
}

fn truncate_summary(text: &str) -> String {
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}...", head)
}

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(?:script|style)\s*>").expect("valid regex")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static ENTITY_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z][A-Za-z0-9]{1,31}));")
        .expect("valid regex")
});

/// Plain text of an HTML fragment with entities decoded and whitespace collapsed
pub fn strip_html(html: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(html, " ");
    let text = TAG.replace_all(&without_code, " ");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode numeric and common named character references; unknown ones are kept
pub fn decode_entities(text: &str) -> String {
    ENTITY_REF
        .replace_all(text, |caps: &Captures| {
            let code = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok()
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else {
                caps.get(3).and_then(|name| html_entity_codepoint(name.as_str()))
            };

            match code.and_then(char::from_u32) {
                // Non-breaking spaces collapse like any other whitespace
                Some('\u{a0}') => " ".to_string(),
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
