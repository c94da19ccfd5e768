//! Feed parsing
//!
//! Turns raw RSS 2.0 / Atom bodies into [`ParsedFeed`]s. Namespaced fields
//! that feeds declare either once or repeatedly are normalized into vectors
//! here, so downstream code never has to care which shape a feed used.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::NewsError;

/// One `<enclosure>` (RSS) or `rel="enclosure"` link (Atom)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: Option<String>,
}

/// A `media:content` / `media:thumbnail` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaRef {
    pub url: Option<String>,
    pub medium: Option<String>,
    pub mime_type: Option<String>,
}

impl MediaRef {
    pub fn with_url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::default()
        }
    }
}

/// Parser representation of a single `<item>` / `<entry>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    /// Publication date exactly as the feed declared it
    pub pub_date: Option<String>,
    /// Full body (`content:encoded` or Atom `<content>`), possibly HTML
    pub content: Option<String>,
    /// Description / summary, possibly HTML
    pub content_snippet: Option<String>,
    /// Directly declared image
    pub image: Option<String>,
    pub enclosures: Vec<Enclosure>,
    pub media_content: Vec<MediaRef>,
    pub media_thumbnail: Vec<MediaRef>,
}

impl RawFeedItem {
    /// Best available HTML body, preferring full content over the snippet
    pub fn html_bodies(&self) -> impl Iterator<Item = &str> {
        self.content
            .as_deref()
            .into_iter()
            .chain(self.content_snippet.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A parsed feed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    /// Channel / feed title, if the feed declares a non-blank one
    pub title: Option<String>,
    pub items: Vec<RawFeedItem>,
}

/// Parse a feed body, trying RSS first and Atom second
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, NewsError> {
    let sanitized = sanitize_xml(&String::from_utf8_lossy(bytes));

    if let Ok(channel) = rss::Channel::read_from(sanitized.as_bytes()) {
        return Ok(from_rss_channel(&channel));
    }

    match atom_syndication::Feed::read_from(sanitized.as_bytes()) {
        Ok(feed) => Ok(from_atom_feed(&feed)),
        Err(e) => Err(NewsError::ParseError(format!(
            "body is neither RSS nor Atom: {}",
            e
        ))),
    }
}

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?").expect("valid regex")
});

/// Repair the most common feed defects before handing the body to a parser:
/// characters that are illegal in XML 1.0, bare `&`, and HTML-only entities.
/// CDATA sections are copied through untouched apart from illegal characters.
pub fn sanitize_xml(body: &str) -> String {
    let cleaned: String = body
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| is_xml_char(*c))
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    let mut rest = cleaned.as_str();
    while let Some(start) = rest.find(CDATA_OPEN) {
        out.push_str(&escape_entities(&rest[..start]));
        let section = &rest[start..];
        // An unterminated section runs to the end of the document
        let end = section
            .find(CDATA_CLOSE)
            .map(|i| i + CDATA_CLOSE.len())
            .unwrap_or(section.len());
        out.push_str(&section[..end]);
        rest = &section[end..];
    }
    out.push_str(&escape_entities(rest));
    out
}

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

fn escape_entities(text: &str) -> std::borrow::Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures| match caps.get(1) {
        None => "&amp;".to_string(),
        Some(entity) => {
            let name = entity.as_str().trim_end_matches(';');
            if name.starts_with('#') {
                return caps[0].to_string();
            }
            match name {
                "amp" | "lt" | "gt" | "quot" | "apos" => caps[0].to_string(),
                _ => match html_entity_codepoint(name) {
                    Some(code) => format!("&#{};", code),
                    None => format!("&amp;{}", entity.as_str()),
                },
            }
        }
    })
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Code point of an HTML named character reference
pub(crate) fn html_entity_codepoint(name: &str) -> Option<u32> {
    let code = match name {
        "quot" => 34,
        "amp" => 38,
        "apos" => 39,
        "lt" => 60,
        "gt" => 62,
        "nbsp" => 160,
        "pound" => 163,
        "laquo" => 171,
        "middot" => 183,
        "raquo" => 187,
        "eacute" => 233,
        "bull" => 8226,
        "euro" => 8364,
        "copy" => 169,
        "reg" => 174,
        "ndash" => 8211,
        "mdash" => 8212,
        "lsquo" => 8216,
        "rsquo" => 8217,
        "ldquo" => 8220,
        "rdquo" => 8221,
        "hellip" => 8230,
        "trade" => 8482,
        _ => return None,
    };
    Some(code)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn from_rss_channel(channel: &rss::Channel) -> ParsedFeed {
    ParsedFeed {
        title: non_blank(Some(channel.title())),
        items: channel.items().iter().map(from_rss_item).collect(),
    }
}

fn from_rss_item(item: &rss::Item) -> RawFeedItem {
    let extensions = item.extensions();

    let image = item
        .itunes_ext()
        .and_then(|ext| non_blank(ext.image()))
        .or_else(|| direct_image(extensions));

    let pub_date = non_blank(item.pub_date()).or_else(|| {
        item.dublin_core_ext()
            .and_then(|dc| non_blank(dc.dates().first().map(String::as_str)))
    });

    RawFeedItem {
        title: item.title().map(str::to_string),
        link: non_blank(item.link()),
        guid: item.guid().and_then(|g| non_blank(Some(g.value()))),
        pub_date,
        content: non_blank(item.content()),
        content_snippet: non_blank(item.description()),
        image,
        enclosures: item
            .enclosure()
            .filter(|e| !e.url().trim().is_empty())
            .map(|e| Enclosure {
                url: e.url().trim().to_string(),
                mime_type: non_blank(Some(e.mime_type())),
            })
            .into_iter()
            .collect(),
        media_content: media_refs(extensions, "content"),
        media_thumbnail: media_refs(extensions, "thumbnail"),
    }
}

fn from_atom_feed(feed: &atom_syndication::Feed) -> ParsedFeed {
    ParsedFeed {
        title: non_blank(Some(feed.title().as_str())),
        items: feed.entries().iter().map(from_atom_entry).collect(),
    }
}

fn from_atom_entry(entry: &atom_syndication::Entry) -> RawFeedItem {
    let links = entry.links();
    let link = links
        .iter()
        .find(|l| l.rel() == "alternate")
        .or_else(|| links.first())
        .and_then(|l| non_blank(Some(l.href())));

    let pub_date = entry
        .published()
        .copied()
        .unwrap_or_else(|| *entry.updated())
        .to_rfc3339();

    let extensions = entry.extensions();

    RawFeedItem {
        title: Some(entry.title().as_str().to_string()),
        link,
        guid: non_blank(Some(entry.id())),
        pub_date: Some(pub_date),
        content: non_blank(entry.content().and_then(|c| c.value())),
        content_snippet: non_blank(entry.summary().map(|s| s.as_str())),
        image: direct_image(extensions),
        enclosures: links
            .iter()
            .filter(|l| l.rel() == "enclosure" && !l.href().trim().is_empty())
            .map(|l| Enclosure {
                url: l.href().trim().to_string(),
                mime_type: non_blank(l.mime_type()),
            })
            .collect(),
        media_content: media_refs(extensions, "content"),
        media_thumbnail: media_refs(extensions, "thumbnail"),
    }
}

type ExtensionMap<E> = BTreeMap<String, BTreeMap<String, Vec<E>>>;

/// Common view over the RSS and Atom extension element types
trait ExtensionNode: Sized {
    fn attr(&self, key: &str) -> Option<&str>;
    fn text(&self) -> Option<&str>;
    fn child_elements(&self, name: &str) -> &[Self];
}

impl ExtensionNode for rss::extension::Extension {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs().get(key).map(String::as_str)
    }

    fn text(&self) -> Option<&str> {
        self.value()
    }

    fn child_elements(&self, name: &str) -> &[Self] {
        self.children().get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ExtensionNode for atom_syndication::extension::Extension {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs().get(key).map(String::as_str)
    }

    fn text(&self) -> Option<&str> {
        self.value()
    }

    fn child_elements(&self, name: &str) -> &[Self] {
        self.children().get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Collect `media:<name>` elements, including those nested in `media:group`
fn media_refs<E: ExtensionNode>(extensions: &ExtensionMap<E>, name: &str) -> Vec<MediaRef> {
    let Some(media) = extensions.get("media") else {
        return Vec::new();
    };

    let top_level = media.get(name).into_iter().flatten();
    let grouped = media
        .get("group")
        .into_iter()
        .flatten()
        .flat_map(|group| group.child_elements(name));

    top_level
        .chain(grouped)
        .map(|ext| MediaRef {
            url: extension_url(ext),
            medium: non_blank(ext.attr("medium")),
            mime_type: non_blank(ext.attr("type")),
        })
        .collect()
}

/// An `<x:image>` element in any non-media namespace
fn direct_image<E: ExtensionNode>(extensions: &ExtensionMap<E>) -> Option<String> {
    extensions
        .iter()
        .filter(|(ns, _)| ns.as_str() != "media")
        .filter_map(|(_, elements)| elements.get("image"))
        .flatten()
        .find_map(extension_url)
}

fn extension_url<E: ExtensionNode>(ext: &E) -> Option<String> {
    non_blank(ext.attr("url"))
        .or_else(|| non_blank(ext.attr("href")))
        .or_else(|| non_blank(ext.text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Bay Area Giving</title>
    <link>https://giving.example.org/</link>
    <description>Local philanthropy news</description>
    <item>
      <title>  Oakland foundation announces grants  </title>
      <link>https://giving.example.org/oakland-grants</link>
      <guid>giving-1</guid>
      <pubDate>Mon, 06 Oct 2025 09:00:00 +0000</pubDate>
      <description><![CDATA[<p>Twelve nonprofits receive funding.</p>]]></description>
      <content:encoded><![CDATA[<figure><img src="https://cdn.example.org/a.jpg"></figure>]]></content:encoded>
      <enclosure url="https://cdn.example.org/enc.png" length="100" type="image/png"/>
      <media:content url="https://cdn.example.org/m1.jpg" medium="image"/>
      <media:group>
        <media:thumbnail url="https://cdn.example.org/thumb.jpg"/>
      </media:group>
    </item>
    <item>
      <title>Second item</title>
      <link>https://giving.example.org/second</link>
    </item>
  </channel>
</rss>"#;

    const SAMPLE_ATOM: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Funder Updates</title>
  <id>urn:funder</id>
  <updated>2025-10-06T12:00:00Z</updated>
  <entry>
    <title>San Jose community fund opens</title>
    <id>urn:funder:1</id>
    <link rel="alternate" href="https://funder.example.org/sj"/>
    <link rel="enclosure" type="image/jpeg" href="https://funder.example.org/sj.jpg"/>
    <updated>2025-10-06T12:00:00Z</updated>
    <summary type="html">&lt;p&gt;Applications due soon&lt;/p&gt;</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let feed = parse_feed(SAMPLE_RSS).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Bay Area Giving"));
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.guid.as_deref(), Some("giving-1"));
        assert_eq!(
            first.pub_date.as_deref(),
            Some("Mon, 06 Oct 2025 09:00:00 +0000")
        );
        assert!(first.content.as_deref().unwrap().contains("<figure>"));
        assert_eq!(first.enclosures.len(), 1);
        assert_eq!(first.enclosures[0].mime_type.as_deref(), Some("image/png"));
        assert_eq!(first.media_content.len(), 1);
        assert_eq!(first.media_content[0].medium.as_deref(), Some("image"));
        assert_eq!(
            first.media_thumbnail,
            vec![MediaRef::with_url("https://cdn.example.org/thumb.jpg")]
        );

        let second = &feed.items[1];
        assert!(second.enclosures.is_empty());
        assert!(second.media_content.is_empty());
        assert!(second.pub_date.is_none());
    }

    #[test]
    fn test_parse_atom_entries() {
        let feed = parse_feed(SAMPLE_ATOM).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Funder Updates"));
        assert_eq!(feed.items.len(), 1);

        let entry = &feed.items[0];
        assert_eq!(entry.link.as_deref(), Some("https://funder.example.org/sj"));
        assert_eq!(entry.guid.as_deref(), Some("urn:funder:1"));
        assert_eq!(entry.enclosures.len(), 1);
        assert_eq!(entry.enclosures[0].url, "https://funder.example.org/sj.jpg");
        assert!(entry.pub_date.as_deref().unwrap().starts_with("2025-10-06T12:00:00"));
        assert!(entry.content_snippet.as_deref().unwrap().contains("Applications"));
    }

    #[test]
    fn test_unparseable_body_is_error() {
        let err = parse_feed(b"<html><body>Service Unavailable</body></html>").unwrap_err();
        assert!(matches!(err, NewsError::ParseError(_)));

        assert!(parse_feed(b"").is_err());
    }

    #[test]
    fn test_sanitize_escapes_bare_ampersands() {
        let fixed = sanitize_xml("<title>Arts & Culture &amp; more &#38; &nbsp;x &bogus;</title>");
        assert_eq!(
            fixed,
            "<title>Arts &amp; Culture &amp; more &#38; &#160;x &amp;bogus;</title>"
        );
    }

    #[test]
    fn test_sanitize_leaves_cdata_alone() {
        let body = "<d>&nbsp;<![CDATA[AT&T &rsquo; [&#8230;]]]> & after</d>";
        assert_eq!(
            sanitize_xml(body),
            "<d>&#160;<![CDATA[AT&T &rsquo; [&#8230;]]]> &amp; after</d>"
        );

        let unterminated = "<d><![CDATA[a & b</d>";
        assert_eq!(sanitize_xml(unterminated), unterminated);
    }

    #[test]
    fn test_cdata_description_keeps_entities_verbatim() {
        let body = br#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Giving Blog</title>
<item><title>Guide</title>
<description><![CDATA[<p>Donors&rsquo; guide&nbsp;to giving [&#8230;]</p>]]></description>
</item></channel></rss>"#;
        let feed = parse_feed(body).unwrap();
        assert_eq!(
            feed.items[0].content_snippet.as_deref(),
            Some("<p>Donors&rsquo; guide&nbsp;to giving [&#8230;]</p>")
        );
    }

    #[test]
    fn test_sanitize_strips_invalid_characters() {
        let fixed = sanitize_xml("\u{feff}<a>ok\u{0}\u{8}\tdone</a>");
        assert_eq!(fixed, "<a>ok\tdone</a>");
    }

    #[test]
    fn test_malformed_feed_recovers() {
        let body = "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>Food & Shelter</title>\
            <item><title>Meals \u{1} served</title><link>https://x.example/a?b=1&c=2</link></item>\
            </channel></rss>";
        let feed = parse_feed(body.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Food & Shelter"));
        assert_eq!(feed.items[0].title.as_deref(), Some("Meals  served"));
        assert_eq!(
            feed.items[0].link.as_deref(),
            Some("https://x.example/a?b=1&c=2")
        );
    }

    #[test]
    fn test_html_bodies_order() {
        let item = RawFeedItem {
            content: Some("full".to_string()),
            content_snippet: Some("snippet".to_string()),
            ..RawFeedItem::default()
        };
        assert_eq!(item.html_bodies().collect::<Vec<_>>(), vec!["full", "snippet"]);

        let empty = RawFeedItem {
            content: Some("   ".to_string()),
            ..RawFeedItem::default()
        };
        assert_eq!(empty.html_bodies().count(), 0);
    }
}
