//! Entry lists read from disk for packing.
//!
//! Three layouts are accepted:
//! - `json`: an array of `{"text": ..., "score": ...}` records or bare strings
//! - `tsv`: `text<TAB>score` per line, score optional
//! - `lines`: one text per line, score 0

use std::fs;
use std::path::Path;

use radix_core::Entry;
use serde::Deserialize;

use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntryFormat {
    Json,
    Tsv,
    Lines,
}

impl EntryFormat {
    /// Guess from the file extension; anything unknown is read as lines.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => EntryFormat::Json,
            Some("tsv") => EntryFormat::Tsv,
            _ => EntryFormat::Lines,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRecord {
    Text(String),
    Entry {
        text: String,
        #[serde(default)]
        score: f64,
    },
}

/// Entries in file order plus the number of skipped lines.
#[derive(Debug, Default)]
pub struct SourceEntries {
    pub entries: Vec<Entry>,
    pub skipped: usize,
}

pub fn read_entries(path: &Path, format: EntryFormat) -> Result<SourceEntries, CliError> {
    let content = fs::read_to_string(path)?;
    parse_entries(&content, format)
}

pub fn parse_entries(content: &str, format: EntryFormat) -> Result<SourceEntries, CliError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    match format {
        EntryFormat::Json => parse_json(content),
        EntryFormat::Tsv => Ok(parse_tsv(content)),
        EntryFormat::Lines => Ok(parse_lines(content)),
    }
}

fn parse_json(content: &str) -> Result<SourceEntries, CliError> {
    let records: Vec<JsonRecord> = serde_json::from_str(content)?;
    let entries = records
        .into_iter()
        .map(|r| match r {
            JsonRecord::Text(text) => Entry::from(text),
            JsonRecord::Entry { text, score } => Entry::from((text, score)),
        })
        .collect();
    Ok(SourceEntries {
        entries,
        skipped: 0,
    })
}

fn parse_tsv(content: &str) -> SourceEntries {
    let mut out = SourceEntries::default();
    for line in content.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (text, score) = match line.split_once('\t') {
            Some((text, score)) => match score.trim().parse::<f64>() {
                Ok(score) if score.is_finite() => (text, score),
                _ => {
                    out.skipped += 1;
                    continue;
                }
            },
            None => (line, 0.0),
        };
        out.entries.push(Entry::from((text, score)));
    }
    out
}

fn parse_lines(content: &str) -> SourceEntries {
    let entries = content
        .lines()
        .filter(|l| !l.is_empty())
        .map(Entry::from)
        .collect();
    SourceEntries {
        entries,
        skipped: 0,
    }
}

/// Download a document over HTTP as text.
pub fn fetch_text(url: &str) -> Result<String, CliError> {
    ureq::get(url)
        .call()
        .map_err(|e| CliError::Http(format!("{url}: {e}")))?
        .into_body()
        .read_to_string()
        .map_err(|e| CliError::Http(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn pairs(src: &SourceEntries) -> Vec<(&str, f64)> {
        src.entries.iter().map(|e| (e.text.as_str(), e.score)).collect()
    }

    #[test]
    fn test_json_records_and_strings() {
        let src = parse_entries(
            r#"[{"text": "car", "score": 0.9}, "cart", {"text": "card"}]"#,
            EntryFormat::Json,
        )
        .unwrap();
        assert_eq!(pairs(&src), vec![("car", 0.9), ("cart", 0.0), ("card", 0.0)]);
    }

    #[test]
    fn test_json_invalid() {
        let err = parse_entries("{\"text\": 1}", EntryFormat::Json).unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }

    #[test]
    fn test_tsv_scores_and_skips() {
        let src = parse_entries(
            "# comment\nNew York\t2.5\nParis\nbad\tx\n\nTokyo\t-1\n",
            EntryFormat::Tsv,
        )
        .unwrap();
        assert_eq!(
            pairs(&src),
            vec![("New York", 2.5), ("Paris", 0.0), ("Tokyo", -1.0)]
        );
        assert_eq!(src.skipped, 1);
    }

    #[test]
    fn test_lines_keep_spaces_and_delimiters() {
        let src =
            parse_entries("\u{feff}a:b\n\n  padded \nc,d\r\n", EntryFormat::Lines).unwrap();
        assert_eq!(
            pairs(&src),
            vec![("a:b", 0.0), ("  padded ", 0.0), ("c,d", 0.0)]
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(EntryFormat::from_path(Path::new("w.json")), EntryFormat::Json);
        assert_eq!(EntryFormat::from_path(Path::new("w.tsv")), EntryFormat::Tsv);
        assert_eq!(EntryFormat::from_path(Path::new("words")), EntryFormat::Lines);
    }

    #[test]
    fn test_read_entries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "alpha\t1\nbeta\t2\n").unwrap();
        let src = read_entries(file.path(), EntryFormat::Tsv).unwrap();
        assert_eq!(pairs(&src), vec![("alpha", 1.0), ("beta", 2.0)]);

        let err = read_entries(Path::new("/nonexistent/words.tsv"), EntryFormat::Tsv);
        assert!(matches!(err, Err(CliError::Io(_))));
    }
}
