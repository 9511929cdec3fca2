//! Keeps model text readable in single-line log records.

const MAX_PREVIEW: usize = 200;

/// Escape newlines and control characters and cap the length.
pub fn preview(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}
