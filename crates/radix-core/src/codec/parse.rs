use tracing::{debug, debug_span, warn};

use super::wire::{parse_children, parse_score};
use super::{
    legacy, FormatError, FormatVersion, ParsedTrie, CASE_INSENSITIVE_FLAG, CASE_SENSITIVE_FLAG,
    CHILD_SEPARATOR, FIELD_SEPARATOR, INNER_MARKER, MAGIC, SCORES_FEATURE, SECTION_SEPARATOR,
    TERMINAL_MARKER,
};
use crate::entry::Entry;
use crate::normalize::CaseMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Header {
    pub version: FormatVersion,
    pub case_mode: CaseMode,
    pub scored: bool,
}

/// One node-table line: a version-specific payload plus child descriptors.
pub(super) struct TableNode<T> {
    pub payload: T,
    pub children: Vec<(String, u32)>,
}

/// Decode a packed document into its entry list.
///
/// The whole document is required: section structure is only known once
/// every separator line has been seen.
pub fn unpack(text: &str) -> Result<ParsedTrie, FormatError> {
    let _span = debug_span!("unpack", bytes = text.len()).entered();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    let Some(first) = lines.first().filter(|l| !l.trim().is_empty()) else {
        return Err(FormatError::Empty);
    };
    let header = parse_header(first)?;

    let sections: Vec<&[&str]> = lines.split(|l| *l == SECTION_SEPARATOR).collect();
    let found = sections.len();
    if found != 2 && found != 3 {
        return Err(FormatError::SectionCount(found));
    }
    let expected = header.version.section_count();
    if found != expected {
        return Err(FormatError::VersionMismatch {
            version: header.version.number(),
            expected,
            found,
        });
    }

    let entries = match header.version {
        FormatVersion::V2 => decode_v2(&header, sections[0], sections[1]),
        FormatVersion::V1 => legacy::decode(&header, sections[0], sections[1], sections[2]),
    };
    debug!(version = header.version.number(), entries = entries.len());

    Ok(ParsedTrie {
        version: header.version,
        case_mode: header.case_mode,
        entries,
    })
}

pub(super) fn parse_header(line: &str) -> Result<Header, FormatError> {
    let fields: Vec<&str> = line.trim_end().split(FIELD_SEPARATOR).collect();
    if fields[0] != MAGIC {
        return Err(FormatError::InvalidMagic(fields[0].to_string()));
    }
    if fields.len() < 3 {
        return Err(FormatError::InvalidHeader(line.to_string()));
    }
    let version = fields[1]
        .parse::<u8>()
        .ok()
        .and_then(FormatVersion::from_number)
        .ok_or_else(|| FormatError::UnsupportedVersion(fields[1].to_string()))?;
    let case_mode = match fields[2] {
        CASE_INSENSITIVE_FLAG => CaseMode::Insensitive,
        CASE_SENSITIVE_FLAG => CaseMode::Sensitive,
        other => return Err(FormatError::InvalidCaseFlag(other.to_string())),
    };

    let mut scored = false;
    for feature in &fields[3..] {
        match *feature {
            SCORES_FEATURE => scored = true,
            "" => {}
            other => return Err(FormatError::UnknownFeature(other.to_string())),
        }
    }

    Ok(Header {
        version,
        case_mode,
        scored,
    })
}

pub(super) fn parse_score_line(line: &str) -> Vec<f64> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split(CHILD_SEPARATOR).map(parse_score).collect()
}

fn decode_v2(header: &Header, head: &[&str], table: &[&str]) -> Vec<Entry> {
    let scores = if header.scored {
        match head.get(1) {
            Some(line) => parse_score_line(line),
            None => {
                warn!("score feature declared but score line missing");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };
    let consumed = if header.scored { 2 } else { 1 };
    if head.len() > consumed {
        warn!(extra = head.len() - consumed, "ignoring extra header lines");
    }

    let nodes: Vec<TableNode<bool>> = table
        .iter()
        .enumerate()
        .map(|(i, line)| parse_node_line(line, i))
        .collect();

    let mut scores = scores.into_iter();
    let mut underrun = 0usize;
    let mut entries = Vec::new();
    walk(&nodes, header.case_mode, |&terminal, text| {
        if terminal {
            let score = scores.next().unwrap_or_else(|| {
                underrun += 1;
                0.0
            });
            entries.push(Entry::new(text, score, ()));
        }
    });

    if underrun > 0 {
        debug!(underrun, "score table exhausted, defaulted to 0");
    }
    let leftover = scores.count();
    if leftover > 0 {
        warn!(leftover, "more scores than terminal nodes");
    }
    entries
}

fn parse_node_line(line: &str, line_no: usize) -> TableNode<bool> {
    let mut chars = line.chars();
    let terminal = match chars.next() {
        Some(TERMINAL_MARKER) => true,
        Some(INNER_MARKER) => false,
        None => {
            warn!(line_no, "empty node line");
            false
        }
        Some(other) => {
            warn!(line_no, marker = %other, "unknown node marker, treated as inner node");
            false
        }
    };
    TableNode {
        payload: terminal,
        children: parse_children(chars.as_str(), line_no),
    }
}

/// Depth-first pre-order walk from node 0, children visited in ascending
/// normalized first char of their label. `visit` gets each node's payload
/// and the concatenated labels on its path.
///
/// Child indices outside the table are skipped, and a node reached a second
/// time (cyclic or shared references in a damaged table) is not revisited.
pub(super) fn walk<T>(
    nodes: &[TableNode<T>],
    case_mode: CaseMode,
    mut visit: impl FnMut(&T, &str),
) {
    if nodes.is_empty() {
        warn!("node table is empty");
        return;
    }
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<(usize, String)> = vec![(0, String::new())];

    while let Some((idx, text)) = stack.pop() {
        let Some(node) = nodes.get(idx) else {
            warn!(idx, "child index outside node table, skipped");
            continue;
        };
        if std::mem::replace(&mut visited[idx], true) {
            warn!(idx, "node reached twice, skipped");
            continue;
        }
        visit(&node.payload, &text);

        let mut children: Vec<&(String, u32)> = node.children.iter().collect();
        children.sort_by_key(|(label, _)| label.chars().next().map(|c| case_mode.fold(c)));
        for (label, child) in children.into_iter().rev() {
            let mut path = String::with_capacity(text.len() + label.len());
            path.push_str(&text);
            path.push_str(label);
            stack.push((*child as usize, path));
        }
    }
}
