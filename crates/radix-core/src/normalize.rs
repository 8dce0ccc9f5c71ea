//! Navigation-key normalization.
//!
//! Keys are folded one character at a time so that a normalized key always
//! has exactly as many characters as the text it came from. Characters whose
//! lowercase form expands to several characters (e.g. `İ`) are kept as-is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    #[default]
    Insensitive,
    Sensitive,
}

impl CaseMode {
    pub fn from_flag(case_sensitive: bool) -> Self {
        if case_sensitive {
            CaseMode::Sensitive
        } else {
            CaseMode::Insensitive
        }
    }

    pub fn is_sensitive(self) -> bool {
        self == CaseMode::Sensitive
    }

    #[inline]
    pub fn fold(self, c: char) -> char {
        match self {
            CaseMode::Sensitive => c,
            CaseMode::Insensitive => fold_char(c),
        }
    }

    /// Normalized key of `text`, one folded char per input char.
    pub fn key(self, text: &str) -> Vec<char> {
        text.chars().map(|c| self.fold(c)).collect()
    }

    pub fn normalize(self, text: &str) -> String {
        text.chars().map(|c| self.fold(c)).collect()
    }
}

/// Single-character lowercase mapping.
pub fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Byte offset of the `n`th char of `s` (or `s.len()` past the end).
pub(crate) fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_ascii_and_unicode() {
        assert_eq!(fold_char('A'), 'a');
        assert_eq!(fold_char('z'), 'z');
        assert_eq!(fold_char('Ä'), 'ä');
        assert_eq!(fold_char('Σ'), 'σ');
        assert_eq!(fold_char('あ'), 'あ');
    }

    #[test]
    fn test_fold_keeps_length_for_expanding_chars() {
        // U+0130 lowercases to "i\u{307}"; it must stay one char
        assert_eq!(fold_char('İ'), 'İ');
        let key = CaseMode::Insensitive.key("İstanbul");
        assert_eq!(key.len(), "İstanbul".chars().count());
    }

    #[test]
    fn test_sensitive_mode_is_identity() {
        assert_eq!(CaseMode::Sensitive.normalize("New York"), "New York");
        assert_eq!(CaseMode::Insensitive.normalize("New York"), "new york");
    }

    #[test]
    fn test_char_offset() {
        assert_eq!(char_offset("añb", 0), 0);
        assert_eq!(char_offset("añb", 2), 3);
        assert_eq!(char_offset("añb", 3), 4);
        assert_eq!(char_offset("añb", 10), 4);
    }
}
