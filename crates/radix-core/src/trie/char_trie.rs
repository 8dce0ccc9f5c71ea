use std::collections::BTreeMap;

use super::{NodeId, PrefixIndex};
use crate::entry::{rank, Entry};
use crate::normalize::CaseMode;

struct CharNode<D> {
    children: BTreeMap<char, NodeId>,
    entries: Vec<Entry<D>>,
}

impl<D> CharNode<D> {
    fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            entries: Vec::new(),
        }
    }
}

/// Uncompressed trie: one node per key character.
///
/// Same observable `insert`/`search` behavior as [`super::RadixTrie`] at a
/// much higher node count; kept as the reference the radix trie is checked
/// against.
pub struct CharTrie<D = ()> {
    nodes: Vec<CharNode<D>>,
    case_mode: CaseMode,
    len: usize,
}

impl<D> CharTrie<D> {
    pub fn new(case_mode: CaseMode) -> Self {
        Self {
            nodes: vec![CharNode::new()],
            case_mode,
            len: 0,
        }
    }

    pub fn insert(&mut self, entry: Entry<D>) {
        let mut node = NodeId::ROOT;
        for c in entry.text.chars().map(|c| self.case_mode.fold(c)) {
            node = match self.nodes[node.index()].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = NodeId(self.nodes.len() as u32);
                    self.nodes.push(CharNode::new());
                    self.nodes[node.index()].children.insert(c, child);
                    child
                }
            };
        }
        self.nodes[node.index()].entries.push(entry);
        self.len += 1;
    }

    pub fn search(&self, prefix: &str, limit: usize) -> Vec<&Entry<D>> {
        let mut node = NodeId::ROOT;
        for c in prefix.chars().map(|c| self.case_mode.fold(c)) {
            match self.nodes[node.index()].children.get(&c) {
                Some(&child) => node = child,
                None => return Vec::new(),
            }
        }

        let mut hits = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let n = &self.nodes[id.index()];
            hits.extend(n.entries.iter());
            stack.extend(n.children.values().copied());
        }
        rank(&mut hits, limit);
        hits
    }
}

impl<D> PrefixIndex<D> for CharTrie<D> {
    fn insert(&mut self, entry: Entry<D>) {
        CharTrie::insert(self, entry)
    }

    fn search(&self, prefix: &str, limit: usize) -> Vec<&Entry<D>> {
        CharTrie::search(self, prefix, limit)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn case_mode(&self) -> CaseMode {
        self.case_mode
    }
}
