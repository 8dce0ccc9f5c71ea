use std::fs;
use std::path::Path;
use std::process;

use radix_core::codec::{
    pack_with_report, unpack, DuplicatePolicy, FormatVersion, PackOptions, PackReport, ParsedTrie,
};
use radix_core::settings::settings;
use radix_core::{CaseMode, Entry, RadixTrie};
use unicode_width::UnicodeWidthStr;

use crate::entry_source::{self, EntryFormat};
use crate::CliError;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Keep {
    First,
    Last,
    Highest,
}

impl From<Keep> for DuplicatePolicy {
    fn from(k: Keep) -> Self {
        match k {
            Keep::First => DuplicatePolicy::KeepFirst,
            Keep::Last => DuplicatePolicy::KeepLast,
            Keep::Highest => DuplicatePolicy::KeepHighest,
        }
    }
}

/// Command-line flags layered over the `[index]`/`[pack]` settings.
#[derive(Debug, Clone, Default)]
pub struct PackOverrides {
    pub case_sensitive: bool,
    pub precision: Option<u8>,
    pub legacy: bool,
    pub keep: Option<Keep>,
}

impl PackOverrides {
    pub fn options(&self) -> PackOptions {
        let mut opts = PackOptions::from_settings(settings());
        if self.case_sensitive {
            opts.case_mode = CaseMode::Sensitive;
        }
        if let Some(p) = self.precision {
            opts.score_precision = p;
        }
        if self.legacy {
            opts.version = FormatVersion::V1;
        }
        if let Some(k) = self.keep {
            opts.duplicates = k.into();
        }
        opts
    }
}

/// Read an entry file, pack it and write the result. Returns the pack
/// report and the number of skipped source lines.
pub fn pack_file(
    input: &Path,
    output: &Path,
    format: EntryFormat,
    opts: &PackOptions,
) -> Result<(PackReport, usize), CliError> {
    let source = entry_source::read_entries(input, format)?;
    let (packed, report) = pack_with_report(&source.entries, opts);
    fs::write(output, packed)?;
    Ok((report, source.skipped))
}

pub fn load_packed(path: &Path) -> Result<ParsedTrie, CliError> {
    let text = fs::read_to_string(path)?;
    Ok(unpack(&text)?)
}

/// Download a packed document and write it only if it decodes.
/// Returns the number of entries it holds.
pub fn fetch_packed(url: &str, output: &Path) -> Result<usize, CliError> {
    let text = entry_source::fetch_text(url)?;
    let parsed = unpack(&text)?;
    fs::write(output, &text)?;
    Ok(parsed.entries.len())
}

fn tsv_field(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// One `text<TAB>score` line per entry, in decoded order.
pub fn format_entries_tsv(entries: &[Entry]) -> String {
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!("{}\t{}\n", tsv_field(&e.text), e.score));
    }
    out
}

/// Ranked hits as aligned columns. Widths are display widths, so CJK text
/// lines up with Latin text.
pub fn format_hits(hits: &[&Entry]) -> String {
    let width = hits
        .iter()
        .map(|e| UnicodeWidthStr::width(tsv_field(&e.text).as_str()))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (i, e) in hits.iter().enumerate() {
        let text = tsv_field(&e.text);
        let pad = width - UnicodeWidthStr::width(text.as_str());
        out.push_str(&format!(
            "{:>3}  {}{}  {}\n",
            i + 1,
            text,
            " ".repeat(pad),
            e.score
        ));
    }
    out
}

pub fn format_info(parsed: &ParsedTrie, trie: &RadixTrie, bytes: usize) -> String {
    let stats = trie.stats();
    let case = if parsed.case_mode.is_sensitive() {
        "sensitive"
    } else {
        "insensitive"
    };
    let mut out = String::new();
    out.push_str(&format!("Format version: {}\n", parsed.version.number()));
    out.push_str(&format!("Case:           {case}\n"));
    out.push_str(&format!("Size:           {bytes} bytes\n"));
    out.push_str(&format!("Entries:        {}\n", stats.entry_count));
    out.push_str(&format!("Terminals:      {}\n", stats.terminal_count));
    out.push_str(&format!("Nodes:          {}\n", stats.node_count));
    out.push_str(&format!("Edges:          {}\n", stats.edge_count));
    out.push_str(&format!("Label chars:    {}\n", stats.label_chars));
    out.push_str(&format!("Max depth:      {}\n", stats.max_depth));
    out
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn pack(input: &str, output: &str, format: Option<EntryFormat>, overrides: &PackOverrides) {
    let input_path = Path::new(input);
    let format = format.unwrap_or_else(|| EntryFormat::from_path(input_path));
    let opts = overrides.options();

    let (report, skipped) = die!(
        pack_file(input_path, Path::new(output), format, &opts),
        "Error packing {input}: {}"
    );
    if skipped > 0 {
        eprintln!("  (skipped {skipped} malformed lines)");
    }
    if report.duplicates > 0 {
        eprintln!(
            "  ({} duplicate texts resolved with {:?})",
            report.duplicates, opts.duplicates
        );
    }
    eprintln!(
        "Wrote {output}: {} entries, {} nodes, {} bytes (format v{})",
        report.terminals,
        report.node_count,
        report.bytes,
        opts.version.number()
    );
}

pub fn unpack_cmd(packed: &str) {
    let parsed = die!(load_packed(Path::new(packed)), "Error reading {packed}: {}");
    print!("{}", format_entries_tsv(&parsed.entries));
}

pub fn search(packed: &str, prefix: &str, n: Option<usize>) {
    let parsed = die!(load_packed(Path::new(packed)), "Error reading {packed}: {}");
    let trie = parsed.into_trie();
    let limit = n.unwrap_or(settings().search.default_limit);
    let hits = trie.search(prefix, limit);
    if hits.is_empty() {
        println!("No entries match \"{prefix}\".");
        return;
    }
    print!("{}", format_hits(&hits));
}

pub fn info(packed: &str) {
    let bytes = fs::metadata(packed).map(|m| m.len() as usize).unwrap_or(0);
    let parsed = die!(load_packed(Path::new(packed)), "Error reading {packed}: {}");
    let trie = RadixTrie::from_entries(parsed.case_mode, parsed.entries.iter().cloned());
    print!("{}", format_info(&parsed, &trie, bytes));
}

pub fn fetch(url: &str, output: &str) {
    let count = die!(fetch_packed(url, Path::new(output)), "Error fetching {url}: {}");
    eprintln!("Wrote {output} ({count} entries)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_pack_file_then_search() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "words.tsv", "car\t0.9\ncard\t0.8\ncart\t0.5\nbad\tx\n");
        let output = dir.path().join("words.rdxp");

        let (report, skipped) =
            pack_file(&input, &output, EntryFormat::Tsv, &PackOptions::default()).unwrap();
        assert_eq!(report.terminals, 3);
        assert_eq!(skipped, 1);

        let trie = load_packed(&output).unwrap().into_trie();
        let texts: Vec<&str> = trie
            .search("car", 10)
            .into_iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["car", "card", "cart"]);
    }

    #[test]
    fn test_legacy_override() {
        let overrides = PackOverrides {
            case_sensitive: true,
            precision: Some(1),
            legacy: true,
            keep: Some(Keep::Highest),
        };
        let opts = overrides.options();
        assert_eq!(opts.version, FormatVersion::V1);
        assert_eq!(opts.case_mode, CaseMode::Sensitive);
        assert_eq!(opts.score_precision, 1);
        assert_eq!(opts.duplicates, DuplicatePolicy::KeepHighest);

        assert_eq!(PackOverrides::default().options(), PackOptions::default());
    }

    #[test]
    fn test_load_packed_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.rdxp", "hello\n::\n.");
        assert!(matches!(load_packed(&path), Err(CliError::Format(_))));
    }

    #[test]
    fn test_fetch_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.rdxp");
        let err = fetch_packed("not a url", &output).unwrap_err();
        assert!(matches!(err, CliError::Http(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_format_hits_aligns_wide_text() {
        let a = Entry::from(("東京", 2.0));
        let b = Entry::from(("Tokyo", 1.5));
        let out = format_hits(&[&a, &b]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  1  東京   2");
        assert_eq!(lines[1], "  2  Tokyo  1.5");
    }

    #[test]
    fn test_format_entries_tsv_escapes() {
        let entries = vec![Entry::from(("a\tb", 1.0)), Entry::from("line\nbreak")];
        assert_eq!(format_entries_tsv(&entries), "a\\tb\t1\nline\\nbreak\t0\n");
    }

    #[test]
    fn test_format_info() {
        let entries = vec![Entry::from("car"), Entry::from("card"), Entry::from("cart")];
        let parsed = unpack(&radix_core::pack(&entries, &PackOptions::default())).unwrap();
        let trie = RadixTrie::from_entries(parsed.case_mode, parsed.entries.iter().cloned());
        let info = format_info(&parsed, &trie, 42);
        assert!(info.contains("Format version: 2\n"));
        assert!(info.contains("Case:           insensitive\n"));
        assert!(info.contains("Entries:        3\n"));
        assert!(info.contains("Nodes:          4\n"));
    }
}
