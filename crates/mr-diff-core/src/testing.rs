//! In-memory data source and helpers for loader tests.

use crate::model::{DiffContent, DiffLine, DiffMetadata, FileRef, Hunk, HunkRange};
use crate::traits::{DiffDataSource, SourceError};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A recorded data source call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Metadata,
    FullDiff,
    Range { start: usize, count: usize },
}

/// Mock data source serving synthetic diffs.
///
/// Every hunk has a single line reading `"<path> hunk <index>"`, so tests can
/// tell which file and slot a loaded hunk came from.
#[derive(Default)]
pub struct MockSource {
    files: HashMap<String, DiffMetadata>,
    calls: Mutex<Vec<Call>>,
    failing_hunks: Mutex<BTreeSet<usize>>,
    fail_full_diff: AtomicBool,
    gates: Gates,
    metadata_gates: Gates,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_large(self, path: &str, hunk_count: usize) -> Self {
        self.with_file(path, hunk_count, true)
    }

    pub fn with_small(self, path: &str, hunk_count: usize) -> Self {
        self.with_file(path, hunk_count, false)
    }

    fn with_file(mut self, path: &str, hunk_count: usize, is_large: bool) -> Self {
        self.files.insert(
            path.to_string(),
            DiffMetadata {
                file_path: path.to_string(),
                is_large,
                hunk_count,
                total_lines: hunk_count,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Reject any range request touching these indices
    pub fn fail_hunks(&self, indices: Range<usize>) {
        self.failing_hunks.lock().unwrap().extend(indices);
    }

    pub fn clear_failures(&self) {
        self.failing_hunks.lock().unwrap().clear();
    }

    pub fn fail_full_diff(&self) {
        self.fail_full_diff.store(true, Ordering::SeqCst);
    }

    /// Hold full diff and range requests for `path` until
    /// [`open`](Self::open) is called. The call is recorded before it blocks.
    pub fn gate(&self, path: &str) {
        close_gate(&self.gates, path);
    }

    /// Release every request held at the gate for `path`
    pub fn open(&self, path: &str) {
        open_gate(&self.gates, path);
    }

    /// Hold metadata requests for `path` until
    /// [`open_metadata`](Self::open_metadata) is called.
    pub fn gate_metadata(&self, path: &str) {
        close_gate(&self.metadata_gates, path);
    }

    pub fn open_metadata(&self, path: &str) {
        open_gate(&self.metadata_gates, path);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn metadata(&self, file: &FileRef) -> Result<&DiffMetadata, SourceError> {
        self.files
            .get(&file.path)
            .ok_or_else(|| SourceError::NotFound(file.to_string()))
    }
}

type Gates = Mutex<HashMap<String, Arc<Semaphore>>>;

fn close_gate(gates: &Gates, path: &str) {
    gates
        .lock()
        .unwrap()
        .insert(path.to_string(), Arc::new(Semaphore::new(0)));
}

fn open_gate(gates: &Gates, path: &str) {
    if let Some(gate) = gates.lock().unwrap().remove(path) {
        gate.close();
    }
}

/// Block until the gate for `path` is opened, if there is one
async fn pass_gate(gates: &Gates, path: &str) {
    let gate = gates.lock().unwrap().get(path).cloned();
    if let Some(gate) = gate {
        // Closed on open; no permits are ever handed out
        let _ = gate.acquire().await;
    }
}

/// Synthetic hunk for `path` at `index`
pub fn hunk(path: &str, index: usize) -> Hunk {
    let line = index as u32 * 10 + 1;
    let mut hunk = Hunk::new(line, 1, line, 1);
    hunk.lines
        .push(DiffLine::addition(format!("{} hunk {}", path, index), line));
    hunk
}

#[async_trait]
impl DiffDataSource for MockSource {
    async fn get_metadata(&self, file: &FileRef) -> Result<DiffMetadata, SourceError> {
        self.record(Call::Metadata);
        pass_gate(&self.metadata_gates, &file.path).await;
        self.metadata(file).cloned()
    }

    async fn get_full_diff(&self, file: &FileRef) -> Result<DiffContent, SourceError> {
        self.record(Call::FullDiff);
        pass_gate(&self.gates, &file.path).await;
        if self.fail_full_diff.load(Ordering::SeqCst) {
            return Err(SourceError::Network("connection reset".to_string()));
        }
        let metadata = self.metadata(file)?;
        Ok(DiffContent {
            file_path: file.path.clone(),
            old_content: String::new(),
            new_content: String::new(),
            hunks: (0..metadata.hunk_count).map(|i| hunk(&file.path, i)).collect(),
        })
    }

    async fn get_hunk_range(
        &self,
        file: &FileRef,
        start_index: usize,
        count: usize,
    ) -> Result<HunkRange, SourceError> {
        self.record(Call::Range {
            start: start_index,
            count,
        });

        pass_gate(&self.gates, &file.path).await;

        let hunk_count = self.metadata(file)?.hunk_count;
        let end = (start_index + count).min(hunk_count);
        let failing = self
            .failing_hunks
            .lock()
            .unwrap()
            .range(start_index..end.max(start_index))
            .next()
            .is_some();
        if failing {
            return Err(SourceError::Network("timeout".to_string()));
        }

        Ok(HunkRange {
            start_index,
            hunks: (start_index..end).map(|i| hunk(&file.path, i)).collect(),
        })
    }
}

/// Yield to spawned tasks until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
