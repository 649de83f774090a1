// ABOUTME: Multi-format feed-parsing engine for feedkit.
// ABOUTME: Detects RSS/Atom/JSON Feed/RSS-in-JSON and normalizes into one canonical model.

pub mod detect;
pub mod duration_parse;
pub mod error;
pub mod html_utils;
pub mod identity;
pub mod image_utils;
pub mod models;
pub mod parser;
pub mod time_parse;

mod atom;
mod json_feed;
mod json_utils;
mod rss;
mod rss_in_json;
mod xml_utils;

pub use detect::{detect, has_feed_characteristics, version_info, VersionInfo};
pub use duration_parse::parse_duration_seconds;
pub use error::ParseError;
pub use html_utils::{decode_entities, is_probably_html, strip_html};
pub use identity::{content_hash, derive_unique_id, IdSignals};
pub use image_utils::{extract_first_image, resolve_url};
pub use models::{
    FeedType, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem,
};
pub use parser::{parse_feed_bytes, parse_feed_str};
pub use time_parse::parse_date;
