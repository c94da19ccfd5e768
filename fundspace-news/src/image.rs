//! Image resolution for feed items
//!
//! Feeds advertise images in many different places. [`resolve_image`] walks
//! them in a fixed order and returns the first usable URL.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::feed::{MediaRef, RawFeedItem};

static IMAGE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(?:jpe?g|png|gif|webp|avif|svg)(?:\?[^\s]*)?$").expect("valid regex")
});

static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static IMG_DATA_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\sdata-src\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static FIGURE_IMG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<figure\b[^>]*>.*?<img\b[^>]*?\s(?:data-)?src\s*=\s*["']([^"']+)["']"#)
        .expect("valid regex")
});

static BARE_IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>()]+?\.(?:jpe?g|png|gif|webp|avif|svg)(?:\?[^\s"'<>]*)?"#)
        .expect("valid regex")
});

static IMG_SRCSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrcset\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static OG_IMAGE: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(
            r#"(?i)<meta\b[^>]*?property\s*=\s*["']og:image["'][^>]*?content\s*=\s*["']([^"']+)["']"#,
        )
        .expect("valid regex"),
        Regex::new(
            r#"(?i)<meta\b[^>]*?content\s*=\s*["']([^"']+)["'][^>]*?property\s*=\s*["']og:image["']"#,
        )
        .expect("valid regex"),
    ]
});

/// Resolve a representative image for `item`; `source` is only used for logging
pub fn resolve_image(item: &RawFeedItem, source: &str) -> Option<String> {
    if let Some(image) = item.image.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        debug!("Image for '{}' from direct image field", title_of(item));
        return Some(image.to_string());
    }

    if let Some(enclosure) = item.enclosures.iter().find(|e| {
        e.mime_type
            .as_deref()
            .map(|m| m.to_ascii_lowercase().contains("image"))
            .unwrap_or(false)
    }) {
        debug!("Image for '{}' from enclosure", title_of(item));
        return Some(enclosure.url.clone());
    }

    if let Some(url) = media_content_image(&item.media_content) {
        debug!("Image for '{}' from media:content", title_of(item));
        return Some(url);
    }

    if let Some(url) = item.media_thumbnail.iter().find_map(|m| m.url.clone()) {
        debug!("Image for '{}' from media:thumbnail", title_of(item));
        return Some(url);
    }

    for body in item.html_bodies() {
        if let Some(url) = extract_image_from_html(body) {
            debug!("Image for '{}' from content body", title_of(item));
            return Some(url);
        }
    }

    for body in item.html_bodies() {
        if let Some(url) = extract_og_image(body) {
            debug!("Image for '{}' from og:image", title_of(item));
            return Some(url);
        }
    }

    debug!("No image found for '{}' from {}", title_of(item), source);
    None
}

fn title_of(item: &RawFeedItem) -> &str {
    item.title.as_deref().unwrap_or("untitled")
}

fn media_content_image(entries: &[MediaRef]) -> Option<String> {
    let declared_image = entries.iter().find(|m| {
        m.url.is_some()
            && (m.medium.as_deref() == Some("image")
                || m.mime_type
                    .as_deref()
                    .map(|t| t.contains("image"))
                    .unwrap_or(false))
    });

    // Fall back to an entry that at least does not claim to be something else
    declared_image
        .or_else(|| {
            entries
                .iter()
                .find(|m| m.url.is_some() && m.medium.is_none() && m.mime_type.is_none())
        })
        .and_then(|m| m.url.clone())
}

/// Find the first image URL in an HTML fragment.
///
/// Tries `<img src>`, `<img data-src>`, the first image inside a `<figure>`,
/// a bare image URL, and finally the first `srcset` candidate. Every
/// candidate must end in a known image extension.
pub fn extract_image_from_html(html: &str) -> Option<String> {
    let captured = |re: &Regex| {
        re.captures_iter(html)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect::<Vec<_>>()
    };

    let candidates = captured(&IMG_SRC)
        .into_iter()
        .chain(captured(&IMG_DATA_SRC))
        .chain(captured(&FIGURE_IMG))
        .chain(BARE_IMAGE_URL.find_iter(html).map(|m| m.as_str().to_string()))
        .chain(captured(&IMG_SRCSET).into_iter().filter_map(|srcset| {
            srcset
                .split(',')
                .next()
                .and_then(|candidate| candidate.split_whitespace().next())
                .map(str::to_string)
        }));

    candidates
        .map(|candidate| unescape_html(candidate.trim()))
        .find(|url| is_image_url(url))
}

/// `<meta property="og:image" content="...">` in an HTML fragment
pub fn extract_og_image(html: &str) -> Option<String> {
    OG_IMAGE
        .iter()
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| unescape_html(m.as_str().trim()))
        .filter(|url| !url.is_empty())
}

/// Whether a URL ends in a known image extension, optionally with a query
pub fn is_image_url(url: &str) -> bool {
    IMAGE_SUFFIX.is_match(url)
}

fn unescape_html(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Deterministic stand-in image for a category label
pub fn fallback_image(category: &str) -> &'static str {
    let lower = category.to_lowercase();
    if lower.contains("philanthrop") || lower.contains("funder") || lower.contains("grant") {
        "https://images.unsplash.com/photo-1532629345422-7515f3d16bb6?w=800&q=80"
    } else if lower.contains("nonprofit") || lower.contains("community") {
        "https://images.unsplash.com/photo-1559027615-cd4628902d4a?w=800&q=80"
    } else if lower.contains("tech") {
        "https://images.unsplash.com/photo-1518770660439-4636190af475?w=800&q=80"
    } else if lower.contains("business") {
        "https://images.unsplash.com/photo-1507679799987-c73779587ccf?w=800&q=80"
    } else if lower.contains("health") {
        "https://images.unsplash.com/photo-1505751172876-fa1923c5c528?w=800&q=80"
    } else if lower.contains("environment") {
        "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=800&q=80"
    } else {
        "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=800&q=80"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Enclosure;

    fn item() -> RawFeedItem {
        RawFeedItem {
            title: Some("Test".to_string()),
            ..RawFeedItem::default()
        }
    }

    #[test]
    fn test_direct_image_beats_enclosure() {
        let mut item = item();
        item.image = Some("https://cdn.example.org/direct.jpg".to_string());
        item.enclosures = vec![Enclosure {
            url: "https://cdn.example.org/enclosure.png".to_string(),
            mime_type: Some("image/png".to_string()),
        }];

        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/direct.jpg")
        );
    }

    #[test]
    fn test_enclosure_with_image_type() {
        let mut item = item();
        item.enclosures = vec![
            Enclosure {
                url: "https://cdn.example.org/episode.mp3".to_string(),
                mime_type: Some("audio/mpeg".to_string()),
            },
            Enclosure {
                url: "https://cdn.example.org/enclosure.png".to_string(),
                mime_type: Some("image/png".to_string()),
            },
        ];

        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/enclosure.png")
        );
    }

    #[test]
    fn test_media_content_prefers_declared_images() {
        let mut item = item();
        item.media_content = vec![
            MediaRef {
                url: Some("https://cdn.example.org/clip.mp4".to_string()),
                medium: Some("video".to_string()),
                mime_type: None,
            },
            MediaRef::with_url("https://cdn.example.org/untyped"),
            MediaRef {
                url: Some("https://cdn.example.org/photo".to_string()),
                medium: None,
                mime_type: Some("image/jpeg".to_string()),
            },
        ];

        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/photo")
        );

        item.media_content.truncate(2);
        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/untyped")
        );

        item.media_content.truncate(1);
        assert_eq!(resolve_image(&item, "feed"), None);
    }

    #[test]
    fn test_thumbnail_before_html() {
        let mut item = item();
        item.media_thumbnail = vec![MediaRef::with_url("https://cdn.example.org/t.jpg")];
        item.content = Some(r#"<img src="https://cdn.example.org/body.jpg">"#.to_string());

        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/t.jpg")
        );
    }

    #[test]
    fn test_html_body_used_after_namespaced_fields() {
        let mut item = item();
        item.content_snippet =
            Some(r#"<p>Hi</p><img class="x" src="https://cdn.example.org/s.png?w=600&amp;h=400">"#.to_string());

        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/s.png?w=600&h=400")
        );
    }

    #[test]
    fn test_og_image_is_last_resort() {
        let mut item = item();
        item.content = Some(
            r#"<meta property="og:image" content="https://cdn.example.org/og?id=1&amp;s=2">"#
                .to_string(),
        );

        assert_eq!(
            resolve_image(&item, "feed").as_deref(),
            Some("https://cdn.example.org/og?id=1&s=2")
        );
    }

    #[test]
    fn test_no_image() {
        let mut item = item();
        item.content = Some("<p>Just words</p>".to_string());
        assert_eq!(resolve_image(&item, "feed"), None);
    }

    #[test]
    fn test_extract_skips_non_image_src() {
        let html = r#"<img src="https://track.example.org/pixel"><img src="https://cdn.example.org/real.webp">"#;
        assert_eq!(
            extract_image_from_html(html).as_deref(),
            Some("https://cdn.example.org/real.webp")
        );
    }

    #[test]
    fn test_extract_data_src_and_srcset() {
        let lazy = r#"<img data-src="https://cdn.example.org/lazy.jpg" src="data:image/gif;base64,R0lG">"#;
        assert_eq!(
            extract_image_from_html(lazy).as_deref(),
            Some("https://cdn.example.org/lazy.jpg")
        );

        let srcset = r#"<img srcset="https://cdn.example.org/small.avif 480w, https://cdn.example.org/big.avif 1080w">"#;
        assert_eq!(
            extract_image_from_html(srcset).as_deref(),
            Some("https://cdn.example.org/small.avif")
        );
    }

    #[test]
    fn test_extract_figure_and_bare_url() {
        let figure = r#"<figure class="hero"><picture><img alt="x" src="https://cdn.example.org/hero.JPG"></picture></figure>"#;
        assert_eq!(
            extract_image_from_html(figure).as_deref(),
            Some("https://cdn.example.org/hero.JPG")
        );

        let bare = "See the photo at https://cdn.example.org/photos/board.jpeg?size=l today";
        assert_eq!(
            extract_image_from_html(bare).as_deref(),
            Some("https://cdn.example.org/photos/board.jpeg?size=l")
        );
    }

    #[test]
    fn test_is_image_url() {
        assert!(is_image_url("https://x.example/a.png"));
        assert!(is_image_url("https://x.example/a.jpeg?x=1&y=2"));
        assert!(!is_image_url("https://x.example/a.png/page"));
        assert!(!is_image_url("https://x.example/article"));
    }

    #[test]
    fn test_fallback_image_is_deterministic() {
        assert_eq!(fallback_image("Philanthropy"), fallback_image("philanthropy"));
        assert_ne!(fallback_image("Philanthropy"), fallback_image("Breaking News"));
        assert!(fallback_image("anything").starts_with("https://"));
    }
}
