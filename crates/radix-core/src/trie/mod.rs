//! In-memory prefix indexes.
//!
//! `RadixTrie` is the production index: single-child chains are compressed
//! into multi-character edges stored in a flat node arena. `CharTrie` keeps
//! one node per character and serves as the reference for search parity.

mod char_trie;
mod radix;
#[cfg(test)]
mod tests;

pub use char_trie::CharTrie;
pub use radix::{Edge, RadixNode, RadixTrie};

use crate::entry::Entry;
use crate::normalize::CaseMode;

/// Arena index of a trie node. The root is always `NodeId::ROOT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural counters, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub entry_count: usize,
    pub terminal_count: usize,
    /// Sum of all edge label lengths, in chars.
    pub label_chars: usize,
    /// Longest root-to-node path, in edges.
    pub max_depth: usize,
}

/// Ranked prefix lookup shared by the trie implementations.
pub trait PrefixIndex<D = ()> {
    fn insert(&mut self, entry: Entry<D>);

    /// Entries whose normalized text starts with `prefix`, best first,
    /// at most `limit` of them.
    fn search(&self, prefix: &str, limit: usize) -> Vec<&Entry<D>>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node_count(&self) -> usize;

    fn case_mode(&self) -> CaseMode;
}
