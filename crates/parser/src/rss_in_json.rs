// ABOUTME: RSS-in-JSON parser (the rss.channel convention over JSON).
// ABOUTME: The item array location is inconsistent in the wild; a fixed search order decides.

use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::html_utils::classify_content;
use crate::identity::{derive_unique_id, IdSignals};
use crate::json_utils::{id_field, object_field, size_field, string_field, JsonObject};
use crate::models::{FeedType, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedItem};
use crate::time_parse::parse_date;

/// Parses an RSS-in-JSON document.
pub fn parse(data: &str, feed_url: &str) -> Result<ParsedFeed, ParseError> {
    let root: Value =
        serde_json::from_str(data).map_err(|err| ParseError::invalid_json(feed_url, err))?;
    let root = root.as_object().ok_or_else(|| {
        ParseError::parse_failed(FeedType::RssInJson, feed_url, "top-level value is not an object")
    })?;

    let channel = object_field(root, "rss")
        .and_then(|rss| object_field(rss, "channel"))
        .ok_or_else(|| ParseError::RssChannelNotFound {
            feed_url: feed_url.to_string(),
        })?;

    let mut feed = ParsedFeed::new(FeedType::RssInJson, feed_url);
    feed.title = string_field(channel, "title");
    feed.home_page_url = string_field(channel, "link");
    feed.description = string_field(channel, "description");
    feed.language = string_field(channel, "language");

    for value in find_items(channel, root, feed_url)? {
        let Some(obj) = value.as_object() else {
            continue;
        };
        match parse_item(obj, feed_url) {
            Some(item) => feed.items.push(item),
            None => debug!(feed_url, "dropping empty RSS-in-JSON item"),
        }
    }
    Ok(feed)
}

/// Locates the item array. The search order is a compatibility contract:
/// changing it changes which array wins when a malformed document carries
/// more than one candidate.
fn find_items<'a>(
    channel: &'a JsonObject,
    root: &'a JsonObject,
    feed_url: &str,
) -> Result<&'a Vec<Value>, ParseError> {
    let candidates = [
        channel.get("item"),
        root.get("item"),
        channel.get("items"),
        root.get("items"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_array)
        .ok_or_else(|| ParseError::RssItemsNotFound {
            feed_url: feed_url.to_string(),
        })
}

fn parse_item(obj: &JsonObject, feed_url: &str) -> Option<ParsedItem> {
    let external_url = string_field(obj, "link");
    let title = string_field(obj, "title");
    let (content_html, content_text) = classify_content(string_field(obj, "description"));
    let date_published = string_field(obj, "pubDate").and_then(|s| parse_date(&s));

    let authors: Vec<ParsedAuthor> = string_field(obj, "author")
        .map(|email| ParsedAuthor {
            email_address: Some(email),
            ..Default::default()
        })
        .into_iter()
        .collect();

    let tags = parse_categories(obj);
    let attachments = parse_enclosure(obj);

    // Placeholder entries with nothing to show are not worth keeping.
    if title.is_none() && content_html.is_none() && content_text.is_none() {
        return None;
    }

    let unique_id = match id_field(obj, "guid") {
        Some(guid) => guid,
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
        content_html,
        content_text,
        date_published,
        authors,
        tags,
        attachments,
        ..Default::default()
    })
}

/// `category` is an object or an array of objects, each carrying `#value`.
fn parse_categories(obj: &JsonObject) -> Vec<String> {
    match obj.get("category") {
        Some(Value::Object(category)) => string_field(category, "#value").into_iter().collect(),
        Some(Value::Array(categories)) => categories
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|c| string_field(c, "#value"))
            .collect(),
        _ => Vec::new(),
    }
}

/// A single enclosure object; its `length` may be numeric or a numeric string.
fn parse_enclosure(obj: &JsonObject) -> Vec<ParsedAttachment> {
    object_field(obj, "enclosure")
        .and_then(|enc| {
            ParsedAttachment::new(
                string_field(enc, "url"),
                string_field(enc, "type"),
                None,
                size_field(enc, "length"),
                None,
            )
        })
        .into_iter()
        .collect()
}
