mod legacy;

use crate::entry::Entry;
use crate::trie::RadixTrie;

fn entries(items: &[(&str, f64)]) -> Vec<Entry> {
    items.iter().map(|&(t, s)| Entry::from((t, s))).collect()
}

fn sorted_pairs(entries: &[Entry]) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> =
        entries.iter().map(|e| (e.text.clone(), e.score)).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pairs
}

fn hits(trie: &RadixTrie, prefix: &str, limit: usize) -> Vec<(String, f64)> {
    trie.search(prefix, limit)
        .into_iter()
        .map(|e| (e.text.clone(), e.score))
        .collect()
}
