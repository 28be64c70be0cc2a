//! Single-line rendering of user-authored text (character names, chat lines)
//! for log output.

const PREVIEW_CHARS: usize = 200;

/// Escape control characters so `s` stays on one log line, and cap its length.
pub fn escape_log(s: &str) -> String {
    escape_log_limited(s, PREVIEW_CHARS)
}

/// [`escape_log`] with an explicit character limit. Truncation is marked with `…`.
pub fn escape_log_limited(s: &str, limit: usize) -> String {
    let mut out = String::with_capacity(s.len().min(limit) + 4);
    let mut chars = s.chars();
    for ch in chars.by_ref().take(limit) {
        if ch == '\\' || ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
