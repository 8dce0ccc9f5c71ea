//! Line-oriented text codec for moving an index between processes.
//!
//! Version 2 layout:
//!
//! ```text
//! RDXP:2:ci:s          header: magic, version, case flag, features
//! 0.9,0.8,0.5          score line (only when some score is non-zero)
//! ::                   section separator
//! .car:1               node 0 (root), one line per node in BFS order
//! !d:2,t:3             node 1: terminal, two children
//! !
//! !
//! ```
//!
//! Version 1 (legacy) carries an explicit text table and per-node entry
//! index lists in three sections; it is still decoded and can be emitted for
//! old consumers.

mod legacy;
mod pack;
mod parse;
#[cfg(test)]
mod tests;
mod wire;

pub use pack::{pack, pack_with_report, PackReport};
pub use parse::unpack;
pub use wire::{escape, unescape};

use serde::Deserialize;

use crate::entry::Entry;
use crate::normalize::CaseMode;
use crate::trie::RadixTrie;

pub const MAGIC: &str = "RDXP";
pub const SECTION_SEPARATOR: &str = "::";
pub const FIELD_SEPARATOR: char = ':';
pub const CHILD_SEPARATOR: char = ',';
pub const ESCAPE: char = '\\';
pub const TERMINAL_MARKER: char = '!';
pub const INNER_MARKER: char = '.';
/// Separates the entry index list from the child descriptors (version 1).
pub const LEGACY_ENTRY_SEPARATOR: char = '|';

pub const CASE_INSENSITIVE_FLAG: &str = "ci";
pub const CASE_SENSITIVE_FLAG: &str = "cs";
pub const SCORES_FEATURE: &str = "s";

/// Largest accepted `score_precision`.
pub const MAX_SCORE_PRECISION: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    V1 = 1,
    V2 = 2,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion::V2;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(FormatVersion::V1),
            2 => Some(FormatVersion::V2),
            _ => None,
        }
    }

    /// Number of separator-delimited sections in a document of this version.
    pub fn section_count(self) -> usize {
        match self {
            FormatVersion::V1 => 3,
            FormatVersion::V2 => 2,
        }
    }
}

/// How the packer resolves entries whose normalized texts collide.
///
/// A packed terminal node holds a single score, unlike a live trie node
/// which keeps every colliding entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The most recently inserted score wins.
    #[default]
    KeepLast,
    KeepFirst,
    KeepHighest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackOptions {
    pub case_mode: CaseMode,
    /// Decimal places kept for each score (clamped to `MAX_SCORE_PRECISION`).
    pub score_precision: u8,
    pub duplicates: DuplicatePolicy,
    pub version: FormatVersion,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            case_mode: CaseMode::Insensitive,
            score_precision: 3,
            duplicates: DuplicatePolicy::KeepLast,
            version: FormatVersion::CURRENT,
        }
    }
}

impl PackOptions {
    pub fn from_settings(s: &crate::settings::Settings) -> Self {
        Self {
            case_mode: CaseMode::from_flag(s.index.case_sensitive),
            score_precision: s.pack.score_precision,
            duplicates: s.pack.duplicates,
            version: FormatVersion::from_number(s.pack.version)
                .unwrap_or(FormatVersion::CURRENT),
        }
    }
}

/// Fatal document-level errors. Line-level damage is recovered instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("empty document")]
    Empty,

    #[error("invalid magic token: {0:?} (expected {MAGIC})")]
    InvalidMagic(String),

    #[error("unsupported version: {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed header: {0:?}")]
    InvalidHeader(String),

    #[error("invalid case flag: {0:?}")]
    InvalidCaseFlag(String),

    #[error("unknown feature flag: {0:?}")]
    UnknownFeature(String),

    #[error("expected 2 or 3 sections, found {0}")]
    SectionCount(usize),

    #[error("version {version} documents have {expected} sections, found {found}")]
    VersionMismatch {
        version: u8,
        expected: usize,
        found: usize,
    },
}

/// Decoded document: the entry list, independent of any live trie.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrie {
    pub version: FormatVersion,
    pub case_mode: CaseMode,
    pub entries: Vec<Entry>,
}

impl ParsedTrie {
    /// Replay the entries into a fresh trie using the decoded case mode.
    pub fn into_trie(self) -> RadixTrie {
        RadixTrie::from_entries(self.case_mode, self.entries)
    }

    /// Like [`Self::into_trie`], attaching a payload to every entry.
    pub fn into_trie_with<D>(self, mut data: impl FnMut(&Entry) -> D) -> RadixTrie<D> {
        let mode = self.case_mode;
        RadixTrie::from_entries(
            mode,
            self.entries.into_iter().map(|e| {
                let d = data(&e);
                Entry::new(e.text, e.score, d)
            }),
        )
    }
}
