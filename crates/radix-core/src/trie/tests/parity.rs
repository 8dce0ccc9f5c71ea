//! The radix trie must rank exactly like the uncompressed reference trie.

use proptest::prelude::*;

use crate::entry::Entry;
use crate::normalize::CaseMode;
use crate::trie::{CharTrie, PrefixIndex, RadixTrie};

fn arb_word() -> impl Strategy<Value = String> {
    // Small alphabet with mixed case so that splits and folding collide often
    prop::collection::vec(
        prop::sample::select(vec!['a', 'b', 'c', 'A', 'B', 'é', 'É', ' ']),
        0..7,
    )
    .prop_map(|cs| cs.into_iter().collect())
}

fn arb_entries() -> impl Strategy<Value = Vec<(String, u8)>> {
    prop::collection::vec((arb_word(), 0u8..4), 0..40)
}

fn ranked<I: PrefixIndex>(index: &I, prefix: &str, limit: usize) -> Vec<(String, f64)> {
    index
        .search(prefix, limit)
        .into_iter()
        .map(|e| (e.text.clone(), e.score))
        .collect()
}

fn build<I: PrefixIndex>(mut index: I, entries: &[(String, u8)]) -> I {
    for (text, score) in entries {
        index.insert(Entry::new(text.clone(), f64::from(*score), ()));
    }
    index
}

proptest! {
    #[test]
    fn radix_matches_char_trie(
        entries in arb_entries(),
        prefix in arb_word(),
        limit in 0usize..12,
        sensitive in any::<bool>(),
    ) {
        let mode = CaseMode::from_flag(sensitive);
        let radix = build(RadixTrie::new(mode), &entries);
        let reference = build(CharTrie::new(mode), &entries);

        prop_assert_eq!(radix.len(), reference.len());
        prop_assert!(radix.node_count() <= reference.node_count());
        prop_assert_eq!(ranked(&radix, &prefix, limit), ranked(&reference, &prefix, limit));
    }

    #[test]
    fn results_follow_sorting_law(entries in arb_entries(), prefix in arb_word()) {
        let radix = build(RadixTrie::new(CaseMode::Insensitive), &entries);
        let hits = radix.search(&prefix, usize::MAX);
        for pair in hits.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.score > b.score || (a.score == b.score && a.text <= b.text));
        }
        let folded = CaseMode::Insensitive.normalize(&prefix);
        for hit in &hits {
            prop_assert!(CaseMode::Insensitive.normalize(&hit.text).starts_with(&folded));
        }
    }
}
