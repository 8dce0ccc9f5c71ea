use tracing::{debug, debug_span};

use super::{NodeId, PrefixIndex, TrieStats};
use crate::entry::{rank, Entry};
use crate::normalize::{char_offset, CaseMode};

/// Outgoing edge. `label` holds normalized characters; `first` caches its
/// first char and is the branching key among siblings.
#[derive(Debug, Clone)]
pub struct Edge {
    pub first: char,
    pub label: String,
    pub child: NodeId,
}

#[derive(Debug, Clone)]
pub struct RadixNode<D> {
    /// Sorted by `first`; no two edges share a first char.
    pub edges: Vec<Edge>,
    pub entries: Vec<Entry<D>>,
}

impl<D> RadixNode<D> {
    fn new() -> Self {
        Self {
            edges: Vec::new(),
            entries: Vec::new(),
        }
    }

    fn find_edge(&self, c: char) -> Result<usize, usize> {
        self.edges.binary_search_by(|e| e.first.cmp(&c))
    }
}

/// Compressed prefix tree over ranked entries.
///
/// Nodes live in a flat arena and are never removed; an edge split replaces
/// the edge's label and target in place and appends the new intermediate
/// node.
#[derive(Debug, Clone)]
pub struct RadixTrie<D = ()> {
    nodes: Vec<RadixNode<D>>,
    case_mode: CaseMode,
    len: usize,
}

impl<D> Default for RadixTrie<D> {
    fn default() -> Self {
        Self::new(CaseMode::default())
    }
}

impl<D> RadixTrie<D> {
    pub fn new(case_mode: CaseMode) -> Self {
        Self {
            nodes: vec![RadixNode::new()],
            case_mode,
            len: 0,
        }
    }

    pub fn from_entries(
        case_mode: CaseMode,
        entries: impl IntoIterator<Item = Entry<D>>,
    ) -> Self {
        let mut trie = Self::new(case_mode);
        for entry in entries {
            trie.insert(entry);
        }
        trie
    }

    pub fn case_mode(&self) -> CaseMode {
        self.case_mode
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &RadixNode<D> {
        &self.nodes[id.index()]
    }

    fn push_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RadixNode::new());
        id
    }

    pub fn insert(&mut self, entry: Entry<D>) {
        let key = self.case_mode.key(&entry.text);
        let mut node = NodeId::ROOT;
        let mut pos = 0;

        loop {
            if pos == key.len() {
                self.nodes[node.index()].entries.push(entry);
                break;
            }

            let slot = self.nodes[node.index()].find_edge(key[pos]);
            let i = match slot {
                Ok(i) => i,
                Err(insert_at) => {
                    let leaf = self.push_node();
                    self.nodes[leaf.index()].entries.push(entry);
                    self.nodes[node.index()].edges.insert(
                        insert_at,
                        Edge {
                            first: key[pos],
                            label: key[pos..].iter().collect(),
                            child: leaf,
                        },
                    );
                    break;
                }
            };

            let edge = &self.nodes[node.index()].edges[i];
            let label_len = edge.label.chars().count();
            let common = edge
                .label
                .chars()
                .zip(&key[pos..])
                .take_while(|(a, b)| a == *b)
                .count();

            if common == label_len {
                node = edge.child;
                pos += common;
                continue;
            }

            // Partial match: split the edge at `common` (always >= 1 since
            // the first chars agree). The loop then either stores the entry
            // at the intermediate node or hangs a new leaf off it.
            let mid = self.push_node();
            let edge = &mut self.nodes[node.index()].edges[i];
            let tail = edge.label.split_off(char_offset(&edge.label, common));
            let old_child = std::mem::replace(&mut edge.child, mid);
            let tail_first = tail.chars().next().unwrap_or(edge.first);
            self.nodes[mid.index()].edges.push(Edge {
                first: tail_first,
                label: tail,
                child: old_child,
            });

            node = mid;
            pos += common;
        }

        self.len += 1;
    }

    /// Resolve the node whose subtree holds every entry starting with `key`.
    fn locate(&self, key: &[char]) -> Option<NodeId> {
        let mut node = NodeId::ROOT;
        let mut pos = 0;

        while pos < key.len() {
            let n = &self.nodes[node.index()];
            let edge = &n.edges[n.find_edge(key[pos]).ok()?];
            let rest = &key[pos..];
            let label_len = edge.label.chars().count();

            if rest.len() <= label_len {
                // The edge is one uninterrupted path: everything below its
                // child starts with the whole label, hence with the prefix.
                return edge
                    .label
                    .chars()
                    .zip(rest)
                    .all(|(a, b)| a == *b)
                    .then_some(edge.child);
            }

            if !edge.label.chars().zip(rest).all(|(a, b)| a == *b) {
                return None;
            }
            node = edge.child;
            pos += label_len;
        }

        Some(node)
    }

    pub fn search(&self, prefix: &str, limit: usize) -> Vec<&Entry<D>> {
        let _span = debug_span!("radix_search", prefix, limit).entered();
        if limit == 0 {
            return Vec::new();
        }
        let key = self.case_mode.key(prefix);
        let Some(start) = self.locate(&key) else {
            return Vec::new();
        };

        let mut hits = self.collect(start);
        let found = hits.len();
        rank(&mut hits, limit);
        debug!(found, returned = hits.len());
        hits
    }

    fn collect(&self, start: NodeId) -> Vec<&Entry<D>> {
        let mut hits = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            hits.extend(node.entries.iter());
            stack.extend(node.edges.iter().map(|e| e.child));
        }
        hits
    }

    /// Entries stored under exactly `text` (after normalization).
    pub fn get(&self, text: &str) -> &[Entry<D>] {
        let key = self.case_mode.key(text);
        let mut node = NodeId::ROOT;
        let mut pos = 0;
        while pos < key.len() {
            let n = &self.nodes[node.index()];
            let Ok(i) = n.find_edge(key[pos]) else {
                return &[];
            };
            let edge = &n.edges[i];
            let label_len = edge.label.chars().count();
            if key.len() - pos < label_len
                || !edge.label.chars().zip(&key[pos..]).all(|(a, b)| a == *b)
            {
                return &[];
            }
            node = edge.child;
            pos += label_len;
        }
        &self.nodes[node.index()].entries
    }

    pub fn contains(&self, text: &str) -> bool {
        !self.get(text).is_empty()
    }

    /// All entries in depth-first order, siblings by ascending first char.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<D>> + '_ {
        let mut stack = vec![NodeId::ROOT];
        let mut pending: std::slice::Iter<'_, Entry<D>> = Default::default();
        std::iter::from_fn(move || loop {
            if let Some(e) = pending.next() {
                return Some(e);
            }
            let id = stack.pop()?;
            let node = &self.nodes[id.index()];
            stack.extend(node.edges.iter().rev().map(|e| e.child));
            pending = node.entries.iter();
        })
    }

    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats {
            node_count: self.nodes.len(),
            entry_count: self.len,
            ..TrieStats::default()
        };
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.index()];
            stats.max_depth = stats.max_depth.max(depth);
            if !node.entries.is_empty() {
                stats.terminal_count += 1;
            }
            for edge in &node.edges {
                stats.edge_count += 1;
                stats.label_chars += edge.label.chars().count();
                stack.push((edge.child, depth + 1));
            }
        }
        stats
    }
}

impl<D> PrefixIndex<D> for RadixTrie<D> {
    fn insert(&mut self, entry: Entry<D>) {
        RadixTrie::insert(self, entry)
    }

    fn search(&self, prefix: &str, limit: usize) -> Vec<&Entry<D>> {
        RadixTrie::search(self, prefix, limit)
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

impl<D> Extend<Entry<D>> for RadixTrie<D> {
    fn extend<I: IntoIterator<Item = Entry<D>>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}
