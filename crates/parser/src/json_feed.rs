// ABOUTME: JSON Feed parser (format versions 1 and 1.1).
// ABOUTME: The items array is mandatory; its absence is a dedicated error kind.

use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::html_utils::is_probably_html;
use crate::identity::{derive_unique_id, IdSignals};
use crate::json_utils::{
    array_field, bool_field, duration_field, id_field, object_field, size_field, string_field,
    JsonObject,
};
use crate::models::{FeedType, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem};
use crate::time_parse::parse_date;

/// Parses a JSON Feed document.
pub fn parse(data: &str, feed_url: &str) -> Result<ParsedFeed, ParseError> {
    let root: Value =
        serde_json::from_str(data).map_err(|err| ParseError::invalid_json(feed_url, err))?;
    let root = root.as_object().ok_or_else(|| {
        ParseError::parse_failed(FeedType::JsonFeed, feed_url, "top-level value is not an object")
    })?;

    let mut feed = ParsedFeed::new(FeedType::JsonFeed, feed_url);
    feed.title = string_field(root, "title");
    feed.home_page_url = string_field(root, "home_page_url");
    // The document's own feed_url claim is ignored: identity stays anchored
    // to the URL the bytes were fetched from.
    feed.description = string_field(root, "description");
    feed.language = string_field(root, "language");
    feed.icon_url = string_field(root, "icon");
    feed.favicon_url = string_field(root, "favicon");
    feed.next_url = string_field(root, "next_url");
    feed.expired = bool_field(root, "expired").unwrap_or(false);
    feed.authors = parse_authors(root);
    feed.hubs = parse_hubs(root);

    // JSON Feed fixes the key name: no items array means not a usable feed.
    let items = array_field(root, "items").ok_or_else(|| ParseError::JsonFeedItemsNotFound {
        feed_url: feed_url.to_string(),
    })?;

    for value in items {
        let Some(obj) = value.as_object() else {
            continue;
        };
        match parse_item(obj, feed_url) {
            Some(item) => feed.items.push(item),
            None => debug!(feed_url, "dropping JSON Feed item with no derivable unique ID"),
        }
    }
    Ok(feed)
}

fn parse_item(obj: &JsonObject, feed_url: &str) -> Option<ParsedItem> {
    let external_url = string_field(obj, "url").or_else(|| string_field(obj, "external_url"));
    let title = string_field(obj, "title");
    let (content_html, content_text) =
        reconcile_content(string_field(obj, "content_html"), string_field(obj, "content_text"));

    let date_published = string_field(obj, "date_published").and_then(|s| parse_date(&s));
    let date_modified = string_field(obj, "date_modified").and_then(|s| parse_date(&s));
    let authors = parse_authors(obj);
    let tags = parse_tags(obj);
    let attachments = parse_attachments(obj);

    let unique_id = match id_field(obj, "id") {
        Some(id) => id,
        None => {
            let signals = IdSignals {
                date_published,
                title: title.as_deref(),
                external_url: external_url.as_deref(),
                author_email: authors.first().and_then(|a| a.email_address.as_deref()),
                attachment_url: attachments.first().map(|a| a.url.as_str()),
                content: content_html.as_deref().or(content_text.as_deref()),
            };
            derive_unique_id(&signals)?
        }
    };

    Some(ParsedItem {
        unique_id,
        feed_url: feed_url.to_string(),
        external_url,
        title,
        language: string_field(obj, "language"),
        content_html,
        content_text,
        summary: string_field(obj, "summary"),
        image_url: string_field(obj, "image"),
        banner_image_url: string_field(obj, "banner_image"),
        date_published,
        date_modified,
        authors,
        tags,
        attachments,
    })
}

/// Applies the engine-wide markup rule to JSON Feed's twin content fields:
/// a markup-free `content_html` is demoted to text, never duplicated.
fn reconcile_content(
    html: Option<String>,
    text: Option<String>,
) -> (Option<String>, Option<String>) {
    match html {
        Some(h) if is_probably_html(&h) => (Some(h), text),
        Some(h) => (None, text.or(Some(h))),
        None => (None, text),
    }
}

/// JSON Feed 1.1 `authors`, falling back to the 1.0 singular `author`.
fn parse_authors(obj: &JsonObject) -> Vec<ParsedAuthor> {
    let from_array = array_field(obj, "authors").map(|authors| {
        authors
            .iter()
            .filter_map(Value::as_object)
            .filter_map(parse_author)
            .collect::<Vec<_>>()
    });
    match from_array {
        Some(authors) if !authors.is_empty() => authors,
        _ => object_field(obj, "author")
            .and_then(parse_author)
            .into_iter()
            .collect(),
    }
}

fn parse_author(obj: &JsonObject) -> Option<ParsedAuthor> {
    let author = ParsedAuthor {
        name: string_field(obj, "name"),
        url: string_field(obj, "url"),
        avatar_url: string_field(obj, "avatar"),
        email_address: None,
    };
    author.has_content().then_some(author)
}

fn parse_hubs(obj: &JsonObject) -> Vec<ParsedHub> {
    array_field(obj, "hubs")
        .map(|hubs| {
            hubs.iter()
                .filter_map(Value::as_object)
                .filter_map(|hub| {
                    ParsedHub::new(string_field(hub, "url"), string_field(hub, "type"), None)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_tags(obj: &JsonObject) -> Vec<String> {
    array_field(obj, "tags")
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_attachments(obj: &JsonObject) -> Vec<ParsedAttachment> {
    array_field(obj, "attachments")
        .map(|attachments| {
            attachments
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|att| {
                    ParsedAttachment::new(
                        string_field(att, "url"),
                        string_field(att, "mime_type"),
                        string_field(att, "title"),
                        size_field(att, "size_in_bytes"),
                        duration_field(att, "duration_in_seconds"),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_URL: &str = "https://example.com/feed.json";

    #[test]
    fn test_minimal_feed() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1.1",
            "title": "My Blog",
            "home_page_url": "https://example.com/",
            "feed_url": "https://elsewhere.example.com/feed.json",
            "items": [
                {
                    "id": "1",
                    "url": "https://example.com/1",
                    "title": "First",
                    "content_html": "<p>Hello</p>",
                    "date_published": "2024-01-15T10:00:00Z"
                }
            ]
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        assert_eq!(feed.feed_type, FeedType::JsonFeed);
        assert_eq!(feed.title.as_deref(), Some("My Blog"));
        // Caller URL wins over the document's feed_url claim.
        assert_eq!(feed.feed_url, FEED_URL);
        assert_eq!(feed.items.len(), 1);

        let item = &feed.items[0];
        assert_eq!(item.unique_id, "1");
        assert_eq!(item.external_url.as_deref(), Some("https://example.com/1"));
        assert_eq!(item.content_html.as_deref(), Some("<p>Hello</p>"));
        assert!(item.date_published.is_some());
    }

    #[test]
    fn test_items_array_is_mandatory() {
        let err = parse(r#"{"version":"https://jsonfeed.org/version/1","title":"T"}"#, FEED_URL)
            .unwrap_err();
        assert!(matches!(err, ParseError::JsonFeedItemsNotFound { .. }));

        let err = parse(
            r#"{"version":"https://jsonfeed.org/version/1","items":{"0":{}}}"#,
            FEED_URL,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::JsonFeedItemsNotFound { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse("{", FEED_URL).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }

    #[test]
    fn test_markup_free_content_html_demoted() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1",
            "items": [{"id": "1", "content_html": "no markup here"}]
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        let item = &feed.items[0];
        assert_eq!(item.content_html, None);
        assert_eq!(item.content_text.as_deref(), Some("no markup here"));
    }

    #[test]
    fn test_numeric_id_stringified() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1",
            "items": [{"id": 17, "title": "n"}]
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        assert_eq!(feed.items[0].unique_id, "17");
    }

    #[test]
    fn test_expired_hubs_and_metadata() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1.1",
            "title": "T",
            "icon": "https://example.com/icon.png",
            "favicon": "https://example.com/favicon.ico",
            "next_url": "https://example.com/feed.json?page=2",
            "expired": true,
            "language": "en",
            "hubs": [
                {"type": "WebSub", "url": "https://hub.example.com/"},
                {"type": "bogus", "url": "gopher://old.example.com/"}
            ],
            "items": []
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        assert!(feed.expired);
        assert_eq!(feed.icon_url.as_deref(), Some("https://example.com/icon.png"));
        assert_eq!(feed.favicon_url.as_deref(), Some("https://example.com/favicon.ico"));
        assert_eq!(feed.next_url.as_deref(), Some("https://example.com/feed.json?page=2"));
        assert_eq!(feed.language.as_deref(), Some("en"));
        // Non-http hub URL rejected.
        assert_eq!(feed.hubs.len(), 1);
        assert_eq!(feed.hubs[0].hub_type.as_deref(), Some("WebSub"));
    }

    #[test]
    fn test_authors_with_legacy_fallback() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1",
            "author": {"name": "Old Style", "avatar": "https://example.com/a.png"},
            "items": [
                {"id": "1", "authors": [{"name": "New Style", "url": "https://example.com/n"}]}
            ]
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        assert_eq!(feed.authors.len(), 1);
        assert_eq!(feed.authors[0].name.as_deref(), Some("Old Style"));
        assert_eq!(feed.authors[0].avatar_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(feed.items[0].authors[0].name.as_deref(), Some("New Style"));
    }

    #[test]
    fn test_attachments() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1",
            "items": [{
                "id": "1",
                "attachments": [
                    {"url": "https://cdn/ep.mp3", "mime_type": "audio/mpeg",
                     "size_in_bytes": 9000, "duration_in_seconds": 1800},
                    {"mime_type": "audio/mpeg"}
                ]
            }]
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        let atts = &feed.items[0].attachments;
        // The url-less candidate is discarded entirely.
        assert_eq!(atts.len(), 1);
        assert_eq!(atts[0].size_in_bytes, Some(9000));
        assert_eq!(atts[0].duration_in_seconds, Some(1800));
    }

    #[test]
    fn test_item_without_signals_dropped() {
        let json = r#"{
            "version": "https://jsonfeed.org/version/1",
            "items": [{"tags": ["orphan"]}, {"id": "kept"}]
        }"#;

        let feed = parse(json, FEED_URL).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].unique_id, "kept");
    }
}
