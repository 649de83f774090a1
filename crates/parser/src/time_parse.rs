// ABOUTME: Flexible date parsing for feed timestamps.
// ABOUTME: Accepts RFC 3339/ISO-8601, RFC 2822, named timezones, and common sloppy variants.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Datetime layouts carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %e %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%e %b %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Datetime layouts with no timezone information; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%a, %d %b %Y %H:%M:%S",
    "%a, %e %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%e %b %Y %H:%M:%S",
];

/// Timezone abbreviations feeds use in the wild, as offsets from UTC in
/// seconds. chrono's `%Z` does not parse these.
const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UT", 0),
    ("UTC", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("EET", 2 * 3600),
    ("EEST", 3 * 3600),
    ("BST", 3600),
    ("JST", 9 * 3600),
    ("AEST", 10 * 3600),
    ("AEDT", 11 * 3600),
    ("NZST", 12 * 3600),
    ("NZDT", 13 * 3600),
];

/// Parses a feed date string into a UTC timestamp.
///
/// Returns `None` for anything unparseable. Callers must treat `None` as
/// "unknown", never as an implicit earliest/latest value.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 covers Atom and JSON Feed; RFC 2822 covers most RSS pubDates.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = parse_named_zone(s) {
        return Some(dt);
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    // Date-only forms round down to midnight UTC.
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d %b %Y") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Handles strings ending in a named timezone abbreviation.
fn parse_named_zone(s: &str) -> Option<DateTime<Utc>> {
    let (zone, offset_secs) = NAMED_ZONES
        .iter()
        .find(|(zone, _)| s.ends_with(zone))
        .copied()?;
    let base = s[..s.len() - zone.len()].trim_end();

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(base, fmt) {
            let offset = FixedOffset::east_opt(offset_secs)?;
            let dt = offset.from_local_datetime(&naive).single()?;
            return Some(dt.with_timezone(&Utc));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_rfc3339() {
        let dt = parse_date("2024-03-01T12:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_with_offset() {
        let dt = parse_date("2024-03-01T12:30:00-05:00").unwrap();
        assert_eq!(dt.hour(), 17);
    }

    #[test]
    fn test_rfc2822() {
        let dt = parse_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap());
    }

    #[test]
    fn test_named_timezone() {
        let dt = parse_date("Mon, 02 Jan 2006 15:04:05 PST").unwrap();
        // PST = UTC-8
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 23, 4, 5).unwrap());
    }

    #[test]
    fn test_naive_assumes_utc() {
        let dt = parse_date("2006-01-02 15:04:05").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn test_date_only() {
        let dt = parse_date("2023-12-25").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_yields_none() {
        assert!(parse_date("").is_none());
        assert!(parse_date("   ").is_none());
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("tomorrow-ish").is_none());
    }
}
