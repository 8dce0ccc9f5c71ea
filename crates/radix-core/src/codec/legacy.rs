//! Version 1 decoding.
//!
//! Layout: header followed by one escaped text line per entry, a separator,
//! one score line (entry-indexed), a separator, then the node table. Node
//! lines are `<entry indices>|<child descriptors>`; texts and scores are
//! looked up by position instead of being rebuilt from edge labels.

use tracing::warn;

use super::parse::{parse_score_line, walk, Header, TableNode};
use super::wire::{from_base36, parse_children, unescape};
use super::{CHILD_SEPARATOR, LEGACY_ENTRY_SEPARATOR};
use crate::entry::Entry;

pub(super) fn decode(
    header: &Header,
    head: &[&str],
    score_section: &[&str],
    table: &[&str],
) -> Vec<Entry> {
    let texts: Vec<String> = head.iter().skip(1).map(|l| unescape(l)).collect();

    let scores = match score_section {
        [] => Vec::new(),
        [line] => parse_score_line(line),
        [line, rest @ ..] => {
            warn!(extra = rest.len(), "ignoring extra score lines");
            parse_score_line(line)
        }
    };
    if scores.len() < texts.len() {
        warn!(
            texts = texts.len(),
            scores = scores.len(),
            "score line shorter than text table, missing scores default to 0"
        );
    }

    let nodes: Vec<TableNode<Vec<u32>>> = table
        .iter()
        .enumerate()
        .map(|(i, line)| parse_node_line(line, i))
        .collect();

    let mut entries = Vec::new();
    walk(&nodes, header.case_mode, |indices, _path| {
        for &idx in indices {
            let Some(text) = texts.get(idx as usize) else {
                warn!(idx, "entry index outside text table, skipped");
                continue;
            };
            let score = scores.get(idx as usize).copied().unwrap_or(0.0);
            entries.push(Entry::new(text.clone(), score, ()));
        }
    });
    entries
}

fn parse_node_line(line: &str, line_no: usize) -> TableNode<Vec<u32>> {
    let Some((indices, children)) = line.split_once(LEGACY_ENTRY_SEPARATOR) else {
        warn!(line_no, "legacy node line without entry separator, skipped");
        return TableNode {
            payload: Vec::new(),
            children: Vec::new(),
        };
    };

    let payload = indices
        .split(CHILD_SEPARATOR)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            let idx = from_base36(s);
            if idx.is_none() {
                warn!(line_no, token = s, "invalid entry index, skipped");
            }
            idx
        })
        .collect();

    TableNode {
        payload,
        children: parse_children(children, line_no),
    }
}
