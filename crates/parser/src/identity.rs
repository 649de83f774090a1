// ABOUTME: Stable unique-ID derivation for items whose source omits a guid/id.
// ABOUTME: First non-empty signal in priority order, hashed with FNV-1a 64.

use chrono::{DateTime, Utc};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// The identity signals an item can offer, in derivation priority order.
/// Content is the last resort.
#[derive(Debug, Default)]
pub struct IdSignals<'a> {
    pub date_published: Option<DateTime<Utc>>,
    pub title: Option<&'a str>,
    pub external_url: Option<&'a str>,
    pub author_email: Option<&'a str>,
    pub attachment_url: Option<&'a str>,
    pub content: Option<&'a str>,
}

/// Derives a unique ID from the first non-empty signal.
///
/// Deterministic across parsers and re-parses: the same input bytes always
/// hash to the same ID. Two entries with identical signals collide on
/// purpose; that collision is the dedup signal for feeds with no guids.
/// Returns `None` when every signal is empty; such items are dropped.
pub fn derive_unique_id(signals: &IdSignals) -> Option<String> {
    let date = signals.date_published.map(|d| d.to_rfc3339());
    let candidates = [
        date.as_deref(),
        signals.title,
        signals.external_url,
        signals.author_email,
        signals.attachment_url,
        signals.content,
    ];
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(content_hash)
}

/// Stable non-cryptographic 64-bit content hash, as 16 hex characters.
///
/// Kept deliberately weak: already-stored item IDs depend on this exact
/// function, so it must not be swapped for a cryptographic hash.
pub fn content_hash(s: &str) -> String {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("hello "));
        assert_eq!(content_hash("").len(), 16);
    }

    #[test]
    fn test_priority_order() {
        let with_title = IdSignals {
            title: Some("A Post"),
            external_url: Some("https://example.com/a"),
            ..Default::default()
        };
        // Title outranks URL.
        assert_eq!(
            derive_unique_id(&with_title),
            Some(content_hash("A Post"))
        );

        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let with_date = IdSignals {
            date_published: Some(date),
            title: Some("A Post"),
            ..Default::default()
        };
        assert_eq!(
            derive_unique_id(&with_date),
            Some(content_hash(&date.to_rfc3339()))
        );
    }

    #[test]
    fn test_content_is_last_resort() {
        let signals = IdSignals {
            content: Some("<p>body</p>"),
            ..Default::default()
        };
        assert_eq!(
            derive_unique_id(&signals),
            Some(content_hash("<p>body</p>"))
        );
    }

    #[test]
    fn test_no_signals_yields_none() {
        assert_eq!(derive_unique_id(&IdSignals::default()), None);
        let blank = IdSignals {
            title: Some("   "),
            ..Default::default()
        };
        assert_eq!(derive_unique_id(&blank), None);
    }
}
