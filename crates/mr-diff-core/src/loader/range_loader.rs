//! Hunk range loading with in-flight deduplication.

use super::LoadContext;
use crate::action::DiffViewAction;
use crate::error::DiffLoadError;
use crate::model::FileRef;
use crate::state::DiffViewState;
use log::{debug, warn};

/// What to fetch for a requested range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePlan {
    /// Indices neither loaded nor loading; these get marked as loading
    pub needed: Vec<usize>,
    /// First index sent to the data source
    pub request_start: usize,
    /// Span from the first to the last needed index, inclusive
    pub request_count: usize,
}

/// Work out which slots of `[start, start + count)` still need fetching.
///
/// The range is clamped to the slot count. The request spans from the lowest
/// to the highest needed index, so already-loaded slots inside a gap are
/// fetched again. Returns `None` when there is nothing to do.
pub fn plan_range(state: &DiffViewState, start: usize, count: usize) -> Option<RangePlan> {
    let hunk_count = state.chunked_len()?;
    if count == 0 || start >= hunk_count {
        return None;
    }
    let end = start.saturating_add(count).min(hunk_count);

    let needed: Vec<usize> = (start..end)
        .filter(|i| !state.loaded.contains(i) && !state.loading.contains(i))
        .collect();

    let (&first, &last) = (needed.first()?, needed.last()?);
    Some(RangePlan {
        request_start: first,
        request_count: last - first + 1,
        needed,
    })
}

/// A reserved fetch: its slots are already marked as loading.
pub struct RangeFetch {
    ctx: LoadContext,
    generation: u64,
    file: FileRef,
    plan: RangePlan,
}

impl RangeFetch {
    /// Fetch the planned range and report back to the store.
    ///
    /// Always ends by clearing the reserved indices from the loading set,
    /// whatever the outcome. A failure is logged and leaves the slots absent.
    pub async fn run(self) {
        let RangeFetch {
            ctx,
            generation,
            file,
            plan,
        } = self;

        let result = ctx
            .source
            .get_hunk_range(&file, plan.request_start, plan.request_count)
            .await;

        let mut store = ctx.lock_store();
        match result {
            Ok(range) => {
                debug!(
                    "Loaded {} hunks at {} for {}",
                    range.hunks.len(),
                    range.start_index,
                    file
                );
                store.dispatch_for(
                    generation,
                    DiffViewAction::RangeLoaded {
                        start_index: range.start_index,
                        hunks: range.hunks,
                    },
                );
            }
            Err(e) => {
                let error = DiffLoadError::RangeFetchFailed {
                    file: file.to_string(),
                    start: plan.request_start,
                    end: plan.request_start + plan.request_count,
                    reason: e.to_string(),
                };
                warn!("{}", error);
            }
        }
        store.dispatch_for(generation, DiffViewAction::RangeLoadDone(plan.needed));
    }
}

/// Fetches hunk ranges for the current selection.
///
/// A slot is never requested twice concurrently: planning and marking the
/// slots as loading happen under one store lock.
#[derive(Clone)]
pub struct HunkRangeLoader {
    ctx: LoadContext,
}

impl HunkRangeLoader {
    pub fn new(ctx: LoadContext) -> Self {
        Self { ctx }
    }

    /// Plan `[start, start + count)` for selection `generation` and mark the
    /// needed slots as loading.
    ///
    /// `None` if the selection is stale, not chunked, or fully covered.
    pub fn reserve(&self, generation: u64, start: usize, count: usize) -> Option<RangeFetch> {
        let mut store = self.ctx.lock_store();
        if !store.is_current(generation) {
            debug!("Range {}+{} skipped: selection is stale", start, count);
            return None;
        }
        let file = store.state().file.clone()?;
        let plan = plan_range(store.state(), start, count)?;

        debug!(
            "Reserving hunks {}+{} of {} ({} needed)",
            plan.request_start,
            plan.request_count,
            file,
            plan.needed.len()
        );
        store.dispatch(DiffViewAction::RangeLoading(plan.needed.clone()));
        drop(store);

        Some(RangeFetch {
            ctx: self.ctx.clone(),
            generation,
            file,
            plan,
        })
    }

    /// Load `[start, start + count)` in the background.
    ///
    /// Returns whether a fetch was started.
    pub fn load_range(&self, generation: u64, start: usize, count: usize) -> bool {
        match self.reserve(generation, start, count) {
            Some(fetch) => {
                self.ctx.tasks.spawn(fetch.run());
                true
            }
            None => false,
        }
    }
}
