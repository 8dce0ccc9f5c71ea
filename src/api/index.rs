use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use radix_core::codec::unpack;
use radix_core::settings::settings;
use radix_core::{CaseMode, RadixTrie};
use tracing::debug;

use super::ApiError;

/// One search result, detached from the trie it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub score: f64,
}

/// A live trie behind build-and-swap publishing.
///
/// Readers take an `Arc` snapshot under a short read lock and search it
/// without holding any lock. Publishers build a complete trie first and
/// only lock to swap the pointer, so a reader never sees a half-built index.
pub struct SharedIndex {
    current: RwLock<Arc<RadixTrie>>,
    generation: AtomicU64,
}

impl SharedIndex {
    pub fn new(case_mode: CaseMode) -> Self {
        Self::from_trie(RadixTrie::new(case_mode))
    }

    pub fn from_trie(trie: RadixTrie) -> Self {
        Self {
            current: RwLock::new(Arc::new(trie)),
            generation: AtomicU64::new(0),
        }
    }

    /// Decode a packed file and serve it.
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path).map_err(|e| ApiError::Io {
            msg: format!("{}: {e}", path.display()),
        })?;
        let trie = unpack(&text)?.into_trie();
        Ok(Self::from_trie(trie))
    }

    pub fn snapshot(&self) -> Arc<RadixTrie> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Swap in `trie` and return the new generation. Snapshots taken
    /// earlier keep the old trie alive until they are dropped.
    pub fn publish(&self, trie: RadixTrie) -> u64 {
        let trie = Arc::new(trie);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = trie;
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(guard);
        debug!(generation = gen, "index published");
        gen
    }

    /// Decode `text` and publish the result. On a format error the current
    /// trie stays in place.
    pub fn load_packed(&self, text: &str) -> Result<u64, ApiError> {
        let trie = unpack(text)?.into_trie();
        Ok(self.publish(trie))
    }

    pub fn search(&self, prefix: &str, limit: usize) -> Vec<SearchHit> {
        let trie = self.snapshot();
        trie.search(prefix, limit)
            .into_iter()
            .map(|e| SearchHit {
                text: e.text.clone(),
                score: e.score,
            })
            .collect()
    }

    /// [`Self::search`] with `search.default_limit` from the settings.
    pub fn search_default(&self, prefix: &str) -> Vec<SearchHit> {
        self.search(prefix, settings().search.default_limit)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new(CaseMode::from_settings(settings()))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use radix_core::codec::{pack, PackOptions};
    use radix_core::Entry;

    use super::*;

    fn packed(items: &[(&str, f64)]) -> String {
        let entries: Vec<Entry> = items.iter().map(|&e| Entry::from(e)).collect();
        pack(&entries, &PackOptions::default())
    }

    #[test]
    fn test_load_and_search() {
        let index = SharedIndex::new(CaseMode::Insensitive);
        assert!(index.is_empty());
        let gen = index
            .load_packed(&packed(&[("car", 0.9), ("card", 0.8), ("cat", 0.5)]))
            .unwrap();
        assert_eq!(gen, 1);
        assert_eq!(index.len(), 3);

        let hits = index.search("ca", 2);
        assert_eq!(
            hits,
            vec![
                SearchHit {
                    text: "car".into(),
                    score: 0.9
                },
                SearchHit {
                    text: "card".into(),
                    score: 0.8
                },
            ]
        );
    }

    #[test]
    fn test_bad_document_keeps_current_trie() {
        let index = SharedIndex::new(CaseMode::Insensitive);
        index.load_packed(&packed(&[("apple", 1.0)])).unwrap();
        let err = index.load_packed("NOPE:2:ci\n::\n.").unwrap_err();
        assert!(matches!(err, ApiError::InvalidData { .. }));
        assert_eq!(index.generation(), 1);
        assert_eq!(index.search("app", 5).len(), 1);
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let index = SharedIndex::new(CaseMode::Insensitive);
        index.load_packed(&packed(&[("old", 1.0)])).unwrap();
        let before = index.snapshot();
        index.load_packed(&packed(&[("new", 1.0)])).unwrap();

        assert_eq!(before.search("o", 5).len(), 1);
        assert!(index.search("o", 5).is_empty());
        assert_eq!(index.search("n", 5).len(), 1);
        assert_eq!(index.generation(), 2);
    }

    #[test]
    fn test_concurrent_readers_during_publish() {
        let index = Arc::new(SharedIndex::new(CaseMode::Insensitive));
        index.load_packed(&packed(&[("a1", 1.0), ("a2", 2.0)])).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for _ in 0..200 {
                        // Either the old or the new trie, never a mix
                        let n = index.search("a", 10).len();
                        assert!(n == 2 || n == 3, "saw {n} hits");
                    }
                })
            })
            .collect();
        for _ in 0..20 {
            index
                .load_packed(&packed(&[("a1", 1.0), ("a2", 2.0), ("a3", 3.0)]))
                .unwrap();
        }
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(index.generation(), 21);
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.rdxp");
        std::fs::write(&path, packed(&[("New York", 2.0), ("Newark", 1.0)])).unwrap();

        let index = SharedIndex::open(&path).unwrap();
        let texts: Vec<String> = index.search("new", 10).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["New York", "Newark"]);

        let err = SharedIndex::open(&dir.path().join("missing.rdxp")).err();
        assert!(matches!(err, Some(ApiError::Io { .. })));
    }

    #[test]
    fn test_search_default_limit() {
        let index = SharedIndex::default();
        let entries: Vec<Entry> = (0..30u32)
            .map(|i| Entry::from((format!("w{i:02}"), f64::from(i))))
            .collect();
        index.publish(RadixTrie::from_entries(CaseMode::Insensitive, entries));
        assert_eq!(index.search_default("w").len(), settings().search.default_limit);
    }
}
