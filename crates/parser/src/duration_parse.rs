// ABOUTME: Duration string parsing for attachment lengths (podcast episodes).
// ABOUTME: Accepts integer seconds, HH:MM:SS, MM:SS, and Go-style strings like "1h30m".

/// Parses a duration string into whole seconds.
/// Returns `None` if nothing matches or the value overflows u32.
pub fn parse_duration_seconds(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<u64>() {
        return u32::try_from(secs).ok();
    }

    if s.contains(':') {
        return colon_seconds(s);
    }

    // "1h30m" style, seen in some podcast feeds.
    parse_duration::parse(s)
        .ok()
        .and_then(|d| u32::try_from(d.as_secs()).ok())
}

/// HH:MM:SS or MM:SS.
fn colon_seconds(s: &str) -> Option<u32> {
    let parts: Vec<&str> = s.split(':').collect();
    let total = match parts.as_slice() {
        [m, sec] => {
            let m: u64 = m.trim().parse().ok()?;
            let sec: u64 = sec.trim().parse().ok()?;
            m * 60 + sec
        }
        [h, m, sec] => {
            let h: u64 = h.trim().parse().ok()?;
            let m: u64 = m.trim().parse().ok()?;
            let sec: u64 = sec.trim().parse().ok()?;
            h * 3600 + m * 60 + sec
        }
        _ => return None,
    };
    u32::try_from(total).ok()
}
