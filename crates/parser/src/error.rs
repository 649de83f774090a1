// ABOUTME: Error taxonomy for the feed-parsing engine.
// ABOUTME: Every variant carries the source URL so callers can attribute failures.

use crate::models::FeedType;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the parsing engine.
///
/// Callers never observe raw library errors: anything a format parser
/// cannot map onto a specific variant is wrapped as `ParseFailed`.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The detector could not classify the input.
    #[error("unrecognized feed format: {feed_url}")]
    UnknownFormat { feed_url: String },

    /// XML document malformed or unparseable.
    #[error("invalid XML in {feed_url}: {reason}")]
    InvalidXml { feed_url: String, reason: String },

    /// JSON document malformed or unparseable.
    #[error("invalid JSON in {feed_url}: {reason}")]
    InvalidJson { feed_url: String, reason: String },

    /// Document parsed but the required channel container is missing.
    #[error("no RSS channel found in {feed_url}")]
    RssChannelNotFound { feed_url: String },

    /// Atom document parsed but carries no feed element.
    #[error("no Atom feed element found in {feed_url}")]
    AtomFeedNotFound { feed_url: String },

    /// RSS-in-JSON document valid but no item array at any searched location.
    #[error("no RSS items found in {feed_url}")]
    RssItemsNotFound { feed_url: String },

    /// JSON Feed document valid but the mandatory `items` array is missing.
    #[error("JSON Feed items array missing in {feed_url}")]
    JsonFeedItemsNotFound { feed_url: String },

    /// Catch-all for unexpected internal failures, with the attempted format.
    #[error("{feed_type} parse failed for {feed_url}: {reason}")]
    ParseFailed {
        feed_type: FeedType,
        feed_url: String,
        reason: String,
    },
}

impl ParseError {
    pub fn invalid_xml(feed_url: &str, reason: impl fmt::Display) -> Self {
        ParseError::InvalidXml {
            feed_url: feed_url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_json(feed_url: &str, reason: impl fmt::Display) -> Self {
        ParseError::InvalidJson {
            feed_url: feed_url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse_failed(feed_type: FeedType, feed_url: &str, reason: impl fmt::Display) -> Self {
        ParseError::ParseFailed {
            feed_type,
            feed_url: feed_url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The source URL the failing document was fetched from.
    pub fn feed_url(&self) -> &str {
        match self {
            ParseError::UnknownFormat { feed_url }
            | ParseError::InvalidXml { feed_url, .. }
            | ParseError::InvalidJson { feed_url, .. }
            | ParseError::RssChannelNotFound { feed_url }
            | ParseError::AtomFeedNotFound { feed_url }
            | ParseError::RssItemsNotFound { feed_url }
            | ParseError::JsonFeedItemsNotFound { feed_url }
            | ParseError::ParseFailed { feed_url, .. } => feed_url,
        }
    }
}
