use super::{entries, hits, sorted_pairs};
use crate::codec::{pack, unpack, FormatVersion, PackOptions};
use crate::normalize::CaseMode;

const LEGACY_CAR_CARD_CAT: &str = "RDXP:1:ci\ncar\ncard\ncat\n::\n0.9,0.8,0.5\n::\n|ca:1\n|r:2,t:3\n0|d:4\n2|\n1|";

fn legacy_opts() -> PackOptions {
    PackOptions {
        version: FormatVersion::V1,
        ..PackOptions::default()
    }
}

#[test]
fn test_emit_legacy_layout() {
    let src = entries(&[("car", 0.9), ("card", 0.8), ("cat", 0.5)]);
    assert_eq!(pack(&src, &legacy_opts()), LEGACY_CAR_CARD_CAT);
}

#[test]
fn test_decode_handwritten_legacy_document() {
    let parsed = unpack(LEGACY_CAR_CARD_CAT).unwrap();
    assert_eq!(parsed.version, FormatVersion::V1);
    assert_eq!(parsed.case_mode, CaseMode::Insensitive);
    assert_eq!(
        sorted_pairs(&parsed.entries),
        vec![
            ("car".to_string(), 0.9),
            ("card".to_string(), 0.8),
            ("cat".to_string(), 0.5),
        ]
    );
}

#[test]
fn test_legacy_and_current_decode_to_same_entries() {
    let src = entries(&[
        ("apple", 1.0),
        ("applet", 0.25),
        ("apply", 0.5),
        ("banana", 2.0),
        ("band", 0.0),
        ("a:b,c", 3.0),
        ("", 0.75),
    ]);
    let v1 = unpack(&pack(&src, &legacy_opts())).unwrap();
    let v2 = unpack(&pack(&src, &PackOptions::default())).unwrap();
    assert_eq!(sorted_pairs(&v1.entries), sorted_pairs(&v2.entries));
    assert_eq!(sorted_pairs(&v2.entries), sorted_pairs(&src));

    let t1 = v1.into_trie();
    let t2 = v2.into_trie();
    for prefix in ["", "a", "app", "ban", "x"] {
        assert_eq!(hits(&t1, prefix, 10), hits(&t2, prefix, 10), "prefix {prefix:?}");
    }
}

#[test]
fn test_legacy_keeps_exact_text_of_kept_entry() {
    let src = entries(&[("Paris", 0.2), ("PARIS", 0.7)]);
    let parsed = unpack(&pack(&src, &legacy_opts())).unwrap();
    assert_eq!(sorted_pairs(&parsed.entries), vec![("PARIS".to_string(), 0.7)]);
}

#[test]
fn test_legacy_multiline_text_escaped() {
    let src = entries(&[("two\nlines", 1.0), ("back\\slash", 2.0)]);
    let packed = pack(&src, &legacy_opts());
    assert!(packed.contains("two\\nlines"));
    let parsed = unpack(&packed).unwrap();
    assert_eq!(sorted_pairs(&parsed.entries), sorted_pairs(&src));
}

#[test]
fn test_legacy_lenient_tables() {
    // Score line too short, an index past the text table and a bad index token
    let doc = "RDXP:1:cs\nab\nac\n::\n0.5\n::\n|a:1\n|b:2,c:3\n0,9|\nzz?,1|";
    let parsed = unpack(doc).unwrap();
    assert_eq!(parsed.case_mode, CaseMode::Sensitive);
    assert_eq!(
        sorted_pairs(&parsed.entries),
        vec![("ab".to_string(), 0.5), ("ac".to_string(), 0.0)]
    );
}

#[test]
fn test_legacy_node_line_without_separator_is_skipped() {
    let doc = "RDXP:1:ci\nx\n::\n1\n::\n|x:1\nbroken";
    let parsed = unpack(doc).unwrap();
    assert!(parsed.entries.is_empty());
}
