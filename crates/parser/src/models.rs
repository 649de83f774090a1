// ABOUTME: Canonical model types shared by all format parsers.
// ABOUTME: ParsedFeed/ParsedItem/ParsedAuthor/ParsedAttachment/ParsedHub value aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The concrete wire format a document was parsed as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedType {
    Rss,
    Atom,
    JsonFeed,
    RssInJson,
    #[default]
    Unknown,
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedType::Rss => "RSS",
            FeedType::Atom => "Atom",
            FeedType::JsonFeed => "JSON Feed",
            FeedType::RssInJson => "RSS-in-JSON",
            FeedType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// An author attached to a feed or an item. Compared by value; no identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAuthor {
    pub name: Option<String>,
    pub url: Option<String>,
    pub avatar_url: Option<String>,
    pub email_address: Option<String>,
}

impl ParsedAuthor {
    /// True if at least one field carries text.
    pub fn has_content(&self) -> bool {
        self.name.is_some()
            || self.url.is_some()
            || self.avatar_url.is_some()
            || self.email_address.is_some()
    }
}

/// A media enclosure (audio, video, or image) attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAttachment {
    pub url: String,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub size_in_bytes: Option<u64>,
    pub duration_in_seconds: Option<u32>,
}

impl ParsedAttachment {
    /// Builds an attachment, rejecting candidates with an empty URL.
    pub fn new(
        url: Option<String>,
        mime_type: Option<String>,
        title: Option<String>,
        size_in_bytes: Option<u64>,
        duration_in_seconds: Option<u32>,
    ) -> Option<Self> {
        let url = url?;
        if url.trim().is_empty() {
            return None;
        }
        Some(ParsedAttachment {
            url,
            mime_type,
            title,
            size_in_bytes,
            duration_in_seconds,
        })
    }
}

/// A WebSub hub advertised by a feed for push-based update notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedHub {
    pub url: String,
    pub hub_type: Option<String>,
    pub description: Option<String>,
}

impl ParsedHub {
    /// Builds a hub, rejecting candidates without an http(s) URL.
    pub fn new(url: Option<String>, hub_type: Option<String>, description: Option<String>) -> Option<Self> {
        let url = url?;
        let parsed = Url::parse(&url).ok()?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return None;
        }
        Some(ParsedHub {
            url,
            hub_type,
            description,
        })
    }
}

/// One article/entry within a feed.
///
/// Immutable value data once built: read/favorite state belongs to the
/// caller, keyed by `(feed_url, unique_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Source-supplied guid/id when present, otherwise derived (see `identity`).
    /// Never empty.
    pub unique_id: String,
    /// Back-reference to the parent feed's `feed_url`.
    pub feed_url: String,
    pub external_url: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    /// At most one of `content_html`/`content_text` is authoritative;
    /// markup-free content always lands in `content_text`.
    pub content_html: Option<String>,
    pub content_text: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub banner_image_url: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub authors: Vec<ParsedAuthor>,
    /// Categories in source order; duplicates allowed.
    pub tags: Vec<String>,
    pub attachments: Vec<ParsedAttachment>,
}

/// One parsed source document, in source item order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFeed {
    /// Set once at parse time.
    pub feed_type: FeedType,
    pub title: Option<String>,
    pub home_page_url: Option<String>,
    /// Always the caller-supplied source URL, never derived from content.
    pub feed_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub icon_url: Option<String>,
    pub favicon_url: Option<String>,
    /// Pagination hint (JSON Feed `next_url`).
    pub next_url: Option<String>,
    pub authors: Vec<ParsedAuthor>,
    pub hubs: Vec<ParsedHub>,
    /// True only if the source explicitly marks itself expired.
    pub expired: bool,
    pub items: Vec<ParsedItem>,
}

impl ParsedFeed {
    /// Starts an empty feed of the given format anchored to the source URL.
    pub fn new(feed_type: FeedType, feed_url: &str) -> Self {
        ParsedFeed {
            feed_type,
            feed_url: feed_url.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_requires_url() {
        assert!(ParsedAttachment::new(None, None, None, None, None).is_none());
        assert!(ParsedAttachment::new(Some("  ".to_string()), None, None, None, None).is_none());

        let att = ParsedAttachment::new(
            Some("https://cdn/ep.mp3".to_string()),
            Some("audio/mpeg".to_string()),
            None,
            Some(12345),
            None,
        )
        .unwrap();
        assert_eq!(att.url, "https://cdn/ep.mp3");
        assert_eq!(att.size_in_bytes, Some(12345));
    }

    #[test]
    fn test_hub_requires_http_scheme() {
        assert!(ParsedHub::new(Some("ftp://hub.example.com".to_string()), None, None).is_none());
        assert!(ParsedHub::new(Some("not a url".to_string()), None, None).is_none());
        assert!(ParsedHub::new(None, Some("websub".to_string()), None).is_none());

        let hub = ParsedHub::new(
            Some("https://hub.example.com/".to_string()),
            Some("websub".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(hub.hub_type.as_deref(), Some("websub"));
    }

    #[test]
    fn test_feed_anchored_to_caller_url() {
        let feed = ParsedFeed::new(FeedType::Rss, "https://example.com/feed.xml");
        assert_eq!(feed.feed_url, "https://example.com/feed.xml");
        assert_eq!(feed.feed_type, FeedType::Rss);
        assert!(feed.items.is_empty());
        assert!(!feed.expired);
    }
}
