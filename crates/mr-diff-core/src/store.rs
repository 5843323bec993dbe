use crate::action::DiffViewAction;
use crate::model::FileRef;
use crate::reducer::reduce;
use crate::state::DiffViewState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Store - holds the diff view state and the current selection's generation
///
/// Every file selection bumps the generation. Async loaders capture the
/// generation they were started for and dispatch through [`dispatch_for`],
/// which drops their results once a newer selection has begun.
///
/// [`dispatch_for`]: DiffStore::dispatch_for
#[derive(Debug, Default)]
pub struct DiffStore {
    state: DiffViewState,
    generation: u64,
}

/// Store shared between the session and its background tasks.
pub type SharedStore = Arc<Mutex<DiffStore>>;

impl DiffStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh store for sharing with loader tasks
    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Get the current state
    pub fn state(&self) -> &DiffViewState {
        &self.state
    }

    /// Generation of the current selection
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Run an action through the reducer
    pub fn dispatch(&mut self, action: DiffViewAction) {
        log::trace!("dispatch {} (generation {})", action.name(), self.generation);
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, &action);
    }

    /// Start a new selection: bump the generation and reset the state.
    ///
    /// Returns the generation loaders for this selection must carry.
    pub fn begin_selection(&mut self, file: FileRef) -> u64 {
        self.generation += 1;
        self.dispatch(DiffViewAction::Reset(file));
        self.generation
    }

    /// Dispatch an action on behalf of the selection `generation`.
    ///
    /// Returns `false` (and drops the action) if that selection is stale.
    pub fn dispatch_for(&mut self, generation: u64, action: DiffViewAction) -> bool {
        if !self.is_current(generation) {
            log::debug!(
                "Dropping stale {} (generation {}, current {})",
                action.name(),
                generation,
                self.generation
            );
            return false;
        }
        self.dispatch(action);
        true
    }
}

/// Lock the shared store, recovering from poisoning.
///
/// State is only ever replaced whole by the reducer, never written in place.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, DiffStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
