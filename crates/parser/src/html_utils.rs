// ABOUTME: HTML normalization helpers shared by all format parsers.
// ABOUTME: Tag stripping, entity decoding, and the HTML/plain-text reclassification rule.

/// True if the text plausibly contains markup.
///
/// The engine-wide rule: a description-like field with no `<` character is
/// plain text, uniformly across all four formats.
pub fn is_probably_html(s: &str) -> bool {
    s.contains('<')
}

/// Splits raw content into `(content_html, content_text)` with at most one
/// side populated. Markup-free content is reclassified as plain text.
pub fn classify_content(raw: Option<String>) -> (Option<String>, Option<String>) {
    match raw {
        None => (None, None),
        Some(s) if s.trim().is_empty() => (None, None),
        Some(s) if is_probably_html(&s) => (Some(s), None),
        Some(s) => (None, Some(s)),
    }
}

/// Strips HTML tags, decodes entities, and collapses whitespace.
/// Naive angle-bracket stripping; sufficient for safe plain-text display.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    collapse_whitespace(&decode_entities(&out))
}

/// Decodes named and numeric (decimal/hex) HTML entities in one pass.
/// Unrecognized entities are left untouched.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        // An entity is "&...;" with a short body; anything else is literal.
        match tail[1..].find(';').filter(|&end| end <= 10) {
            Some(end) => {
                let body = &tail[1..=end];
                match decode_entity_body(body) {
                    Some(decoded) => out.push_str(&decoded),
                    None => {
                        out.push('&');
                        out.push_str(body);
                        out.push(';');
                    }
                }
                rest = &tail[end + 2..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes a single entity body (the part between `&` and `;`).
fn decode_entity_body(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "bull" => "•",
        "middot" => "·",
        "deg" => "°",
        "euro" => "€",
        "pound" => "£",
        "yen" => "¥",
        "cent" => "¢",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Collapses runs of whitespace into single spaces and trims the ends.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}
