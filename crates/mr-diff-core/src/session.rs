//! Diff Session Controller
//!
//! Entry point for an embedding application: owns the store and the loaders
//! for one diff view and wires renderer input to them.

use crate::action::DiffViewAction;
use crate::loader::{HunkRangeLoader, LoadContext, MetadataProber, PrefetchScheduler};
use crate::model::{DiffLine, FileRef};
use crate::state::{DiffSnapshot, DiffViewState, LineSelection};
use crate::store::DiffStore;
use crate::traits::DiffDataSource;
use mr_review_config::DiffLoadingConfig;
use std::sync::Arc;
use tokio::runtime::Handle;

/// One diff view: the selected file, its loading pipeline and its state.
///
/// All methods are synchronous and return immediately; fetches run on the
/// given runtime and land in the store as they complete.
pub struct DiffSession {
    ctx: LoadContext,
    prober: MetadataProber,
    ranges: HunkRangeLoader,
    prefetch: PrefetchScheduler,
}

impl DiffSession {
    pub fn new(source: Arc<dyn DiffDataSource>, config: DiffLoadingConfig, runtime: Handle) -> Self {
        let ctx = LoadContext::new(source, DiffStore::shared(), config, runtime);
        Self {
            prober: MetadataProber::new(ctx.clone()),
            ranges: HunkRangeLoader::new(ctx.clone()),
            prefetch: PrefetchScheduler::new(ctx.clone()),
            ctx,
        }
    }

    /// Select `file`: reset the view and start probing it.
    ///
    /// Anything still in flight for the previous file is discarded when it
    /// lands. Returns the new selection's generation.
    pub fn select_file(&self, file: FileRef) -> u64 {
        let generation = self.ctx.lock_store().begin_selection(file.clone());
        log::info!("Selected {} (generation {})", file, generation);
        self.prober.spawn(generation, file);
        generation
    }

    /// Re-run the pipeline for the current file, e.g. after a terminal error.
    pub fn retry(&self) -> Option<u64> {
        let file = self.ctx.lock_store().state().file.clone()?;
        Some(self.select_file(file))
    }

    /// Renderer scrolled to `scroll_offset`. Returns whether a fetch started.
    pub fn on_scroll(&self, scroll_offset: f64) -> bool {
        self.prefetch.on_scroll(scroll_offset)
    }

    /// Renderer reported a click on a line.
    pub fn on_line_click(&self, hunk_index: usize, line_index: usize) {
        self.ctx
            .lock_store()
            .dispatch(DiffViewAction::SelectLine(LineSelection::new(
                hunk_index, line_index,
            )));
    }

    /// Explicitly load `[start, start + count)` of the current selection.
    pub fn load_range(&self, start: usize, count: usize) -> bool {
        let generation = self.generation();
        self.ranges.load_range(generation, start, count)
    }

    pub fn generation(&self) -> u64 {
        self.ctx.lock_store().generation()
    }

    /// Read the current state under the store lock.
    pub fn read<R>(&self, f: impl FnOnce(&DiffViewState) -> R) -> R {
        f(self.ctx.lock_store().state())
    }

    /// Renderer-facing projection of the current state.
    pub fn snapshot(&self) -> DiffSnapshot {
        self.read(DiffViewState::snapshot)
    }

    /// The clicked line, once its hunk is loaded.
    pub fn selected_line(&self) -> Option<DiffLine> {
        self.read(|state| state.selected_line().cloned())
    }

    /// Wait until every background fetch has completed.
    pub async fn settle(&self) {
        self.ctx.tasks.settle().await;
    }
}
