use std::collections::VecDeque;

use tracing::{debug, debug_span};

use super::wire::{escape, format_score, to_base36, write_children};
use super::{
    DuplicatePolicy, FormatVersion, PackOptions, CASE_INSENSITIVE_FLAG, CASE_SENSITIVE_FLAG,
    CHILD_SEPARATOR, FIELD_SEPARATOR, INNER_MARKER, LEGACY_ENTRY_SEPARATOR, MAGIC,
    MAX_SCORE_PRECISION, SCORES_FEATURE, SECTION_SEPARATOR, TERMINAL_MARKER,
};
use crate::entry::Entry;
use crate::normalize::{char_offset, CaseMode};

/// Summary of one packing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    pub entries_in: usize,
    /// Terminal nodes emitted (distinct normalized texts).
    pub terminals: usize,
    pub node_count: usize,
    /// Entries whose normalized text collided with an earlier one.
    pub duplicates: usize,
    pub scored: bool,
    pub bytes: usize,
}

struct Terminal {
    score: f64,
    text: String,
}

/// Edge of the packing trie. `label` keeps the casing of the entry that
/// created it; `first` is the normalized branching key.
struct PackEdge {
    first: char,
    label: String,
    child: usize,
}

struct PackNode {
    edges: Vec<PackEdge>,
    terminal: Option<Terminal>,
}

impl PackNode {
    fn new() -> Self {
        Self {
            edges: Vec::new(),
            terminal: None,
        }
    }
}

struct PackTrie {
    nodes: Vec<PackNode>,
    case_mode: CaseMode,
    duplicates: DuplicatePolicy,
    collisions: usize,
}

impl PackTrie {
    fn new(case_mode: CaseMode, duplicates: DuplicatePolicy) -> Self {
        Self {
            nodes: vec![PackNode::new()],
            case_mode,
            duplicates,
            collisions: 0,
        }
    }

    fn push_node(&mut self) -> usize {
        self.nodes.push(PackNode::new());
        self.nodes.len() - 1
    }

    fn insert(&mut self, text: &str, score: f64) {
        let mode = self.case_mode;
        let key = mode.key(text);
        let mut node = 0;
        let mut pos = 0;

        while pos < key.len() {
            let i = match self.nodes[node]
                .edges
                .binary_search_by(|e| e.first.cmp(&key[pos]))
            {
                Ok(i) => i,
                Err(insert_at) => {
                    let leaf = self.push_node();
                    self.nodes[node].edges.insert(
                        insert_at,
                        PackEdge {
                            first: key[pos],
                            label: text[char_offset(text, pos)..].to_string(),
                            child: leaf,
                        },
                    );
                    node = leaf;
                    break;
                }
            };

            let edge = &self.nodes[node].edges[i];
            let label_len = edge.label.chars().count();
            let common = edge
                .label
                .chars()
                .map(|c| mode.fold(c))
                .zip(&key[pos..])
                .take_while(|(a, b)| a == *b)
                .count();

            if common == label_len {
                node = edge.child;
                pos += common;
                continue;
            }

            let mid = self.push_node();
            let edge = &mut self.nodes[node].edges[i];
            let tail = edge.label.split_off(char_offset(&edge.label, common));
            let old_child = std::mem::replace(&mut edge.child, mid);
            let tail_first = tail.chars().next().map_or(edge.first, |c| mode.fold(c));
            self.nodes[mid].edges.push(PackEdge {
                first: tail_first,
                label: tail,
                child: old_child,
            });
            node = mid;
            pos += common;
        }

        self.set_terminal(node, text, score);
    }

    fn set_terminal(&mut self, node: usize, text: &str, score: f64) {
        let Some(existing) = self.nodes[node].terminal.as_mut() else {
            self.nodes[node].terminal = Some(Terminal {
                score,
                text: text.to_string(),
            });
            return;
        };

        self.collisions += 1;
        debug!(
            text,
            kept = existing.text.as_str(),
            policy = ?self.duplicates,
            "normalized text collision"
        );
        let replace = match self.duplicates {
            DuplicatePolicy::KeepLast => true,
            DuplicatePolicy::KeepFirst => false,
            DuplicatePolicy::KeepHighest => score > existing.score,
        };
        if replace {
            existing.score = score;
            existing.text = text.to_string();
        }
    }

    /// Node ids in breadth-first order; children are already sorted by
    /// normalized first char.
    fn bfs_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([0usize]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.nodes[id].edges.iter().map(|e| e.child));
        }
        order
    }

    /// Terminal nodes in depth-first pre-order, children ascending. This is
    /// the order scores (and legacy entry indices) are written in.
    fn dfs_terminals(&self) -> Vec<(usize, &Terminal)> {
        let mut out = Vec::new();
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if let Some(t) = &node.terminal {
                out.push((id, t));
            }
            stack.extend(node.edges.iter().rev().map(|e| e.child));
        }
        out
    }
}

/// Pack `entries` into the text format selected by `opts.version`.
pub fn pack<'a, D: 'a>(
    entries: impl IntoIterator<Item = &'a Entry<D>>,
    opts: &PackOptions,
) -> String {
    pack_with_report(entries, opts).0
}

pub fn pack_with_report<'a, D: 'a>(
    entries: impl IntoIterator<Item = &'a Entry<D>>,
    opts: &PackOptions,
) -> (String, PackReport) {
    let _span = debug_span!("pack", version = opts.version.number()).entered();
    let precision = opts.score_precision.min(MAX_SCORE_PRECISION);

    let mut trie = PackTrie::new(opts.case_mode, opts.duplicates);
    let mut entries_in = 0;
    for entry in entries {
        trie.insert(&entry.text, entry.score);
        entries_in += 1;
    }

    let bfs = trie.bfs_order();
    let mut index_of = vec![0u32; trie.nodes.len()];
    for (i, &id) in bfs.iter().enumerate() {
        index_of[id] = i as u32;
    }
    let terminals = trie.dfs_terminals();

    let (out, scored) = match opts.version {
        FormatVersion::V2 => emit_v2(&trie, &bfs, &index_of, &terminals, precision),
        FormatVersion::V1 => emit_v1(&trie, &bfs, &index_of, &terminals, precision),
    };

    let report = PackReport {
        entries_in,
        terminals: terminals.len(),
        node_count: trie.nodes.len(),
        duplicates: trie.collisions,
        scored,
        bytes: out.len(),
    };
    debug!(
        entries_in,
        terminals = report.terminals,
        nodes = report.node_count,
        duplicates = report.duplicates,
        bytes = report.bytes,
    );
    (out, report)
}

fn header(version: FormatVersion, case_mode: CaseMode, scored: bool) -> String {
    let case = if case_mode.is_sensitive() {
        CASE_SENSITIVE_FLAG
    } else {
        CASE_INSENSITIVE_FLAG
    };
    let mut line = format!(
        "{MAGIC}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{case}",
        version.number()
    );
    if scored {
        line.push(FIELD_SEPARATOR);
        line.push_str(SCORES_FEATURE);
    }
    line
}

fn score_line(terminals: &[(usize, &Terminal)], precision: u8) -> String {
    let mut line = String::new();
    for (i, (_, t)) in terminals.iter().enumerate() {
        if i > 0 {
            line.push(CHILD_SEPARATOR);
        }
        line.push_str(&format_score(t.score, precision));
    }
    line
}

fn emit_v2(
    trie: &PackTrie,
    bfs: &[usize],
    index_of: &[u32],
    terminals: &[(usize, &Terminal)],
    precision: u8,
) -> (String, bool) {
    let scored = terminals.iter().any(|(_, t)| t.score != 0.0);

    let mut out = header(FormatVersion::V2, trie.case_mode, scored);
    out.push('\n');
    if scored {
        out.push_str(&score_line(terminals, precision));
        out.push('\n');
    }
    out.push_str(SECTION_SEPARATOR);

    for &id in bfs {
        let node = &trie.nodes[id];
        out.push('\n');
        out.push(if node.terminal.is_some() {
            TERMINAL_MARKER
        } else {
            INNER_MARKER
        });
        write_children(
            &mut out,
            node.edges
                .iter()
                .map(|e| (e.label.as_str(), index_of[e.child])),
        );
    }
    (out, scored)
}

fn emit_v1(
    trie: &PackTrie,
    bfs: &[usize],
    index_of: &[u32],
    terminals: &[(usize, &Terminal)],
    precision: u8,
) -> (String, bool) {
    // Entry index = position in DFS terminal order
    let mut entry_of = vec![None; trie.nodes.len()];
    for (i, (id, _)) in terminals.iter().enumerate() {
        entry_of[*id] = Some(i as u32);
    }

    let mut out = header(FormatVersion::V1, trie.case_mode, false);
    for (_, t) in terminals {
        out.push('\n');
        out.push_str(&escape(&t.text));
    }
    out.push('\n');
    out.push_str(SECTION_SEPARATOR);
    out.push('\n');
    out.push_str(&score_line(terminals, precision));
    out.push('\n');
    out.push_str(SECTION_SEPARATOR);

    for &id in bfs {
        out.push('\n');
        if let Some(entry) = entry_of[id] {
            out.push_str(&to_base36(entry));
        }
        out.push(LEGACY_ENTRY_SEPARATOR);
        write_children(
            &mut out,
            trie.nodes[id]
                .edges
                .iter()
                .map(|e| (e.label.as_str(), index_of[e.child])),
        );
    }
    let scored = terminals.iter().any(|(_, t)| t.score != 0.0);
    (out, scored)
}
