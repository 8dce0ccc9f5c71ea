use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A ranked text record. `data` is an opaque payload carried alongside the
/// text; the codec never serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<D = ()> {
    pub text: String,
    #[serde(default)]
    pub score: f64,
    pub data: D,
}

impl<D> Entry<D> {
    pub fn new(text: impl Into<String>, score: f64, data: D) -> Self {
        Self {
            text: text.into(),
            score,
            data,
        }
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Entry::new(text, 0.0, ())
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Entry::new(text, 0.0, ())
    }
}

impl From<(&str, f64)> for Entry {
    fn from((text, score): (&str, f64)) -> Self {
        Entry::new(text, score, ())
    }
}

impl From<(String, f64)> for Entry {
    fn from((text, score): (String, f64)) -> Self {
        Entry::new(text, score, ())
    }
}

/// Result ordering: higher score first, then ascending text (original casing).
pub fn rank_order<D>(a: &Entry<D>, b: &Entry<D>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.text.cmp(&b.text))
}

/// Sort `hits` by [`rank_order`] and keep the best `limit`.
pub(crate) fn rank<D>(hits: &mut Vec<&Entry<D>>, limit: usize) {
    if limit == 0 {
        hits.clear();
        return;
    }
    if hits.len() > limit {
        hits.select_nth_unstable_by(limit - 1, |a, b| rank_order(a, b));
        hits.truncate(limit);
    }
    hits.sort_by(|a, b| rank_order(a, b));
}
