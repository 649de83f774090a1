// ABOUTME: Dispatcher facade: detection, parser selection, and uniform error translation.
// ABOUTME: The single entry point collaborators call with fetched bytes and their source URL.

use tracing::debug;

use crate::detect::detect;
use crate::error::ParseError;
use crate::models::{FeedType, ParsedFeed};
use crate::{atom, json_feed, rss, rss_in_json};

/// Parses raw feed bytes into the canonical model.
///
/// `feed_url` is the URL the bytes were fetched from; it anchors the result
/// (and all of its items) for downstream deduplication. The engine never
/// fetches anything itself, and never retries; both belong to the caller.
pub fn parse_feed_bytes(data: &[u8], feed_url: &str) -> Result<ParsedFeed, ParseError> {
    let text = String::from_utf8_lossy(data);
    parse_feed_str(&text, feed_url)
}

/// Text-input variant of [`parse_feed_bytes`].
pub fn parse_feed_str(data: &str, feed_url: &str) -> Result<ParsedFeed, ParseError> {
    match detect(data) {
        FeedType::Rss => rss::parse(data, feed_url),
        FeedType::Atom => atom::parse(data, feed_url),
        FeedType::JsonFeed => json_feed::parse(data, feed_url),
        FeedType::RssInJson => rss_in_json::parse(data, feed_url),
        FeedType::Unknown => {
            // Detection never throws, so a JSON candidate that failed to
            // parse arrives here; surface the sharper error for it.
            let trimmed = data.trim_start_matches('\u{feff}').trim_start();
            if trimmed.starts_with('{') {
                if let Err(err) = serde_json::from_str::<serde_json::Value>(trimmed) {
                    return Err(ParseError::invalid_json(feed_url, err));
                }
            }
            debug!(feed_url, "input did not match any supported feed format");
            Err(ParseError::UnknownFormat {
                feed_url: feed_url.to_string(),
            })
        }
    }
}
