//! Async loading pipeline for the selected file's diff.
//!
//! - [`MetadataProber`]: classifies the selection and loads it whole or
//!   allocates slots and loads the first batch
//! - [`HunkRangeLoader`]: fetches ranges of hunk slots without duplicates
//! - [`PrefetchScheduler`]: turns scroll offsets into hunk ranges
//!
//! All three share a [`LoadContext`] and report back by dispatching actions
//! to the store, tagged with the generation of the selection they serve.

mod prefetch;
mod prober;
mod range_loader;

pub use prefetch::{prefetch_window, PrefetchScheduler};
pub use prober::MetadataProber;
pub use range_loader::{plan_range, HunkRangeLoader, RangeFetch, RangePlan};

use crate::action::DiffViewAction;
use crate::store::{self, DiffStore, SharedStore};
use crate::traits::DiffDataSource;
use mr_review_config::DiffLoadingConfig;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Everything a loader needs: the data source, the store and where to spawn.
#[derive(Clone)]
pub struct LoadContext {
    pub source: Arc<dyn DiffDataSource>,
    pub store: SharedStore,
    pub config: DiffLoadingConfig,
    pub tasks: TaskSet,
}

impl LoadContext {
    pub fn new(
        source: Arc<dyn DiffDataSource>,
        store: SharedStore,
        config: DiffLoadingConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            source,
            store,
            config,
            tasks: TaskSet::new(runtime),
        }
    }

    pub fn lock_store(&self) -> MutexGuard<'_, DiffStore> {
        store::lock(&self.store)
    }

    /// Dispatch on behalf of `generation`; `false` if the selection is stale.
    pub fn dispatch_for(&self, generation: u64, action: DiffViewAction) -> bool {
        self.lock_store().dispatch_for(generation, action)
    }
}

/// Background tasks spawned by the loaders.
///
/// Fire-and-forget from the caller's point of view, but tracked so tests and
/// the CLI can wait for the pipeline to go quiet.
#[derive(Clone)]
pub struct TaskSet {
    runtime: Handle,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TaskSet {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Spawn a loader task on the runtime
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.runtime.spawn(future);
        let mut handles = self.lock_handles();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Wait until every spawned task, including ones spawned while waiting,
    /// has completed.
    pub async fn settle(&self) {
        loop {
            let batch: Vec<JoinHandle<()>> = std::mem::take(&mut *self.lock_handles());
            if batch.is_empty() {
                return;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    log::error!("Diff loader task failed: {}", e);
                }
            }
        }
    }

    fn lock_handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
