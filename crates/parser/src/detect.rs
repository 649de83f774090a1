// ABOUTME: Format detection for raw feed documents.
// ABOUTME: Classifies input as JSON Feed / RSS-in-JSON / RSS / Atom / Unknown before dispatch.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::FeedType;

const ATOM_NS: &str = "http://www.w3.org/2005/atom";
const JSON_FEED_VERSION_PREFIX: &str = "https://jsonfeed.org/version/";

/// Keywords whose presence hints that a document is feed-like.
/// Diagnostics only; never used for routing.
const FEED_KEYWORDS: &[&str] = &[
    "<rss", "<feed", "<atom", "<channel", "<item", "<entry", "\"version\"", "\"items\"",
    "\"entries\"", "\"title\"", "\"link\"",
];

static FEED_KEYWORD_AUTOMATON: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(FEED_KEYWORDS)
        .expect("feed keyword set is static and valid")
});

/// Declared version metadata extracted alongside detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub feed_type: FeedType,
    pub version: Option<String>,
    pub namespace: Option<String>,
}

/// Classifies raw input into one of the supported formats.
///
/// Never fails: malformed JSON/XML degrades to `Unknown` rather than
/// propagating an error out of detection.
pub fn detect(data: &str) -> FeedType {
    version_info(data).feed_type
}

/// Classifies raw input and reports the version the document declares.
pub fn version_info(data: &str) -> VersionInfo {
    let trimmed = data.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return VersionInfo::default();
    }

    if trimmed.starts_with('{') {
        return detect_json(trimmed);
    }
    if trimmed.starts_with('<') {
        return detect_xml(trimmed);
    }
    VersionInfo::default()
}

/// True if the content contains any feed-like keyword, case-insensitively.
/// A heuristic hint for diagnostics, not a routing decision.
pub fn has_feed_characteristics(data: &str) -> bool {
    FEED_KEYWORD_AUTOMATON.is_match(data)
}

fn detect_json(data: &str) -> VersionInfo {
    let root: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(_) => return VersionInfo::default(),
    };

    let version = root.get("version").map(stringify_version);

    if let Some(ref v) = version {
        let bare = v.strip_prefix(JSON_FEED_VERSION_PREFIX).unwrap_or(v);
        if bare.starts_with('1') {
            return VersionInfo {
                feed_type: FeedType::JsonFeed,
                version,
                namespace: None,
            };
        }
    }

    let looks_like_rss = root.get("rss").is_some()
        || version.as_deref().is_some_and(|v| v.starts_with('2'));
    if looks_like_rss {
        // RSS-in-JSON nests its version attribute under the rss object.
        let version = version.or_else(|| {
            root.get("rss")
                .and_then(|rss| rss.get("version"))
                .map(stringify_version)
        });
        return VersionInfo {
            feed_type: FeedType::RssInJson,
            version,
            namespace: None,
        };
    }

    VersionInfo::default()
}

fn detect_xml(data: &str) -> VersionInfo {
    // Substring checks only; full XML parsing is the parser's job.
    let lower = data.to_lowercase();

    if lower.contains("<rss") && lower.contains("version=") {
        return VersionInfo {
            feed_type: FeedType::Rss,
            version: extract_version_attribute(&lower, data),
            namespace: None,
        };
    }

    let has_atom_ns = lower.contains(&format!("xmlns=\"{ATOM_NS}\""))
        || lower.contains(&format!("xmlns='{ATOM_NS}'"));
    if lower.contains("<feed") && has_atom_ns {
        return VersionInfo {
            feed_type: FeedType::Atom,
            version: Some("1.0".to_string()),
            namespace: Some("http://www.w3.org/2005/Atom".to_string()),
        };
    }

    VersionInfo::default()
}

/// Pulls the quoted value following the first `version=` token.
fn extract_version_attribute(lower: &str, original: &str) -> Option<String> {
    let at = lower.find("version=")?;
    let rest = original.get(at + "version=".len()..)?;
    let mut chars = rest.chars();
    let quote = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value: String = chars.take_while(|&c| c != quote).collect();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn stringify_version(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
