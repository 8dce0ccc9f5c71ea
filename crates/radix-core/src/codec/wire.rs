//! Low-level pieces of the text format: escaping, base-36 indices, score
//! rendering and child descriptor lists.

use tracing::warn;

use super::{CHILD_SEPARATOR, ESCAPE, FIELD_SEPARATOR};

/// Escape the structural delimiters, newline and carriage return. Every
/// other char passes through unchanged.
pub fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            ESCAPE | FIELD_SEPARATOR | CHILD_SEPARATOR => {
                out.push(ESCAPE);
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown sequences yield the escaped char and a
/// dangling trailing backslash is kept literally.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push(ESCAPE),
        }
    }
    out
}

/// Split `s` on every `sep` that is not preceded by an escape.
pub(crate) fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut iter = s.char_indices();
    while let Some((i, c)) = iter.next() {
        if c == ESCAPE {
            iter.next();
        } else if c == sep {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Byte offset of the first unescaped `sep`.
fn find_unescaped(s: &str, sep: char) -> Option<usize> {
    let mut iter = s.char_indices();
    while let Some((i, c)) = iter.next() {
        if c == ESCAPE {
            iter.next();
        } else if c == sep {
            return Some(i);
        }
    }
    None
}

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub(crate) fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(7);
    while n > 0 {
        buf.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    // Only ASCII digits were pushed
    String::from_utf8(buf).unwrap_or_default()
}

pub(crate) fn from_base36(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    u32::from_str_radix(s, 36).ok()
}

/// Round to `precision` decimals and render in the shortest form that
/// parses back to the rounded value ("0.9", "1", "-2.25").
pub(crate) fn format_score(score: f64, precision: u8) -> String {
    let factor = 10f64.powi(i32::from(precision));
    let rounded = (score * factor).round() / factor;
    if rounded == 0.0 {
        // also folds -0.0
        return "0".to_string();
    }
    if rounded.is_finite() {
        format!("{rounded}")
    } else {
        format!("{score}")
    }
}

/// Parse one score token; anything unparsable counts as 0.
pub(crate) fn parse_score(token: &str) -> f64 {
    match token.trim().parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(token, "unparsable score, using 0");
            0.0
        }
    }
}

/// Parse `label:idx,label:idx,...` into unescaped labels and child indices.
/// Descriptors without a separator or with a bad index are skipped.
pub(crate) fn parse_children(s: &str, line_no: usize) -> Vec<(String, u32)> {
    if s.is_empty() {
        return Vec::new();
    }
    let mut children = Vec::new();
    for desc in split_unescaped(s, CHILD_SEPARATOR) {
        let Some(at) = find_unescaped(desc, FIELD_SEPARATOR) else {
            warn!(line_no, desc, "child descriptor without index separator, skipped");
            continue;
        };
        let (label, idx) = (&desc[..at], &desc[at + FIELD_SEPARATOR.len_utf8()..]);
        let Some(idx) = from_base36(idx) else {
            warn!(line_no, desc, "child descriptor with invalid index, skipped");
            continue;
        };
        let label = unescape(label);
        if label.is_empty() {
            warn!(line_no, desc, "child descriptor with empty label, skipped");
            continue;
        }
        children.push((label, idx));
    }
    children
}

/// Render child descriptors for one node line.
pub(crate) fn write_children<'a>(
    out: &mut String,
    children: impl IntoIterator<Item = (&'a str, u32)>,
) {
    for (i, (label, idx)) in children.into_iter().enumerate() {
        if i > 0 {
            out.push(CHILD_SEPARATOR);
        }
        out.push_str(&escape(label));
        out.push(FIELD_SEPARATOR);
        out.push_str(&to_base36(idx));
    }
}
