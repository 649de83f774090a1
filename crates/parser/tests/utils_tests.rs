// ABOUTME: Integration tests for the shared helper modules.
// ABOUTME: Covers date parsing, durations, HTML normalization, identity, and detection hints.

use feedkit_parser::{
    content_hash, decode_entities, derive_unique_id, extract_first_image, has_feed_characteristics,
    parse_date, parse_duration_seconds, strip_html, IdSignals,
};

mod date_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_iso_and_rfc2822() {
        assert_eq!(
            parse_date("2024-06-15T14:30:00Z").unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap()
        );
        assert_eq!(
            parse_date("Sat, 15 Jun 2024 14:30:00 +0200").unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_named_timezones() {
        assert_eq!(
            parse_date("Mon, 02 Jan 2006 15:04:05 GMT").unwrap(),
            Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()
        );
        assert_eq!(
            parse_date("Mon, 02 Jan 2006 15:04:05 EST").unwrap(),
            Utc.with_ymd_and_hms(2006, 1, 2, 20, 4, 5).unwrap()
        );
    }

    #[test]
    fn test_sloppy_variants() {
        assert!(parse_date("2 Jan 2006 15:04:05 -0700").is_some());
        assert!(parse_date("2006-01-02").is_some());
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }
}

mod duration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formats() {
        assert_eq!(parse_duration_seconds("90"), Some(90));
        assert_eq!(parse_duration_seconds("05:30"), Some(330));
        assert_eq!(parse_duration_seconds("01:02:03"), Some(3723));
        assert_eq!(parse_duration_seconds("1h30m"), Some(5400));
        assert_eq!(parse_duration_seconds("forever"), None);
    }
}

mod html_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_and_decode() {
        assert_eq!(strip_html("<p>Tom &amp; Jerry</p>"), "Tom & Jerry");
        assert_eq!(strip_html("<div>a</div>\n<div>b</div>"), "a b");
        assert_eq!(decode_entities("&#x26;&amp;"), "&&");
    }
}

mod identity_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hash_shape_and_stability() {
        let hash = content_hash("https://example.com/post/1");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, content_hash("https://example.com/post/1"));
    }

    #[test]
    fn test_same_signals_collide_by_design() {
        let a = IdSignals {
            title: Some("Repeated Title"),
            ..Default::default()
        };
        let b = IdSignals {
            title: Some("Repeated Title"),
            ..Default::default()
        };
        assert_eq!(derive_unique_id(&a), derive_unique_id(&b));
    }
}

mod image_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_image_with_base() {
        let html = r#"<p>x</p><img src="/a.png">"#;
        assert_eq!(
            extract_first_image(html, Some("https://example.com/post")),
            Some("https://example.com/a.png".to_string())
        );
    }
}

mod detection_hint_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keyword_hints() {
        assert!(has_feed_characteristics("<rss version=\"2.0\">"));
        assert!(has_feed_characteristics("<FEED>"));
        assert!(has_feed_characteristics(r#"{"entries": []}"#));
        assert!(!has_feed_characteristics("nothing feedlike in here"));
    }
}
