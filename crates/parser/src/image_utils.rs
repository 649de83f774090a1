// ABOUTME: First-image extraction from item content HTML.
// ABOUTME: Last-resort image source when a feed supplies no explicit item image.

use scraper::{Html, Selector};
use url::Url;

/// Substrings marking tracking pixels and other junk images.
const JUNK_PATTERNS: &[&str] = &[
    "pixel",
    "tracking",
    "beacon",
    "spacer",
    "clear.gif",
    "blank.gif",
    "1x1",
];

/// Returns the first plausible image URL in an HTML fragment.
/// Relative sources are resolved against `base_url` when provided.
pub fn extract_first_image(html: &str, base_url: Option<&str>) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse("img[src]").ok()?;

    for img in fragment.select(&selector) {
        let Some(src) = img.value().attr("src").map(str::trim) else {
            continue;
        };
        if src.is_empty() {
            continue;
        }
        if let Some(resolved) = resolve_url(src, base_url) {
            if !is_junk_image(&resolved) {
                return Some(resolved);
            }
        }
    }
    None
}

/// Resolves a possibly-relative URL against a base. Absolute http(s) URLs
/// pass through unchanged; anything unresolvable yields `None`.
pub fn resolve_url(src: &str, base_url: Option<&str>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }
    let base = Url::parse(base_url?).ok()?;
    base.join(src).ok().map(String::from)
}

fn is_junk_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    JUNK_PATTERNS.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_image_absolute() {
        let html = r#"<p>intro</p><img src="https://example.com/a.jpg"><img src="https://example.com/b.jpg">"#;
        assert_eq!(
            extract_first_image(html, None),
            Some("https://example.com/a.jpg".to_string())
        );
    }

    #[test]
    fn test_relative_resolved_against_base() {
        let html = r#"<img src="/img/a.jpg">"#;
        assert_eq!(
            extract_first_image(html, Some("https://example.com/post1")),
            Some("https://example.com/img/a.jpg".to_string())
        );
    }

    #[test]
    fn test_relative_without_base_skipped() {
        assert_eq!(extract_first_image(r#"<img src="/img/a.jpg">"#, None), None);
    }

    #[test]
    fn test_tracking_pixels_skipped() {
        let html = r#"<img src="https://ads.example.com/pixel.gif"><img src="https://example.com/real.png">"#;
        assert_eq!(
            extract_first_image(html, None),
            Some("https://example.com/real.png".to_string())
        );
    }

    #[test]
    fn test_no_images() {
        assert_eq!(extract_first_image("<p>text only</p>", None), None);
        assert_eq!(extract_first_image("", None), None);
    }
}
