use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use radix_core::codec::unpack;
use tracing::{debug, warn};

use crate::api::{ApiError, SharedIndex};

// ---------------------------------------------------------------------------
// Work / Result types
// ---------------------------------------------------------------------------

struct LoadWork {
    text: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub entries: usize,
    pub nodes: usize,
    /// Generation of the shared index after the publish.
    pub published: u64,
}

#[derive(Debug)]
pub struct LoadResult {
    /// Submission this result answers.
    pub generation: u64,
    pub outcome: Result<LoadSummary, ApiError>,
}

// ---------------------------------------------------------------------------
// LoadWorker
// ---------------------------------------------------------------------------

/// Decodes packed documents on a background thread and publishes them to a
/// [`SharedIndex`].
///
/// Submissions that queue up while a load is running are collapsed to the
/// newest one, and a load overtaken by a later submission is dropped before
/// it is published.
pub struct LoadWorker {
    work_tx: mpsc::Sender<LoadWork>,
    result_rx: Mutex<mpsc::Receiver<LoadResult>>,
    generation: Arc<AtomicU64>,
}

impl LoadWorker {
    pub fn spawn(index: Arc<SharedIndex>) -> Result<Self, ApiError> {
        let generation = Arc::new(AtomicU64::new(0));
        let (work_tx, work_rx) = mpsc::channel::<LoadWork>();
        let (result_tx, result_rx) = mpsc::channel::<LoadResult>();
        {
            let gen = Arc::clone(&generation);
            thread::Builder::new()
                .name("radixpack-loader".into())
                .spawn(move || load_worker(work_rx, result_tx, gen, index))
                .map_err(|e| ApiError::Internal {
                    msg: format!("failed to spawn load worker: {e}"),
                })?;
        }

        Ok(Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
            generation,
        })
    }

    /// Queue a packed document; returns its generation.
    pub fn submit(&self, text: String) -> u64 {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.work_tx.send(LoadWork {
            text,
            generation: gen,
        });
        gen
    }

    /// Make every pending submission stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn try_recv(&self) -> Option<LoadResult> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadResult> {
        let rx = self.result_rx.lock().ok()?;
        rx.recv_timeout(timeout).ok()
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn load_worker(
    rx: mpsc::Receiver<LoadWork>,
    tx: mpsc::Sender<LoadResult>,
    gen: Arc<AtomicU64>,
    index: Arc<SharedIndex>,
) {
    while let Ok(work) = rx.recv() {
        // Drain: if multiple work items queued, skip to latest
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        if latest.generation != gen.load(Ordering::SeqCst) {
            debug!(generation = latest.generation, "stale load skipped");
            continue;
        }

        let parsed = match unpack(&latest.text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(generation = latest.generation, error = %e, "packed document rejected");
                let _ = tx.send(LoadResult {
                    generation: latest.generation,
                    outcome: Err(e.into()),
                });
                continue;
            }
        };
        let trie = parsed.into_trie();

        // Check staleness after the build
        if latest.generation != gen.load(Ordering::SeqCst) {
            debug!(generation = latest.generation, "stale build discarded");
            continue;
        }

        let entries = trie.len();
        let nodes = trie.node_count();
        let published = index.publish(trie);
        let _ = tx.send(LoadResult {
            generation: latest.generation,
            outcome: Ok(LoadSummary {
                entries,
                nodes,
                published,
            }),
        });
    }
}
