//! Diff View Reducer
//!
//! Pure state transitions for the diff view. No I/O, no clocks: the same
//! state and action always produce the same next state.

use crate::action::DiffViewAction;
use crate::state::{DiffBody, DiffViewState};

/// Reducer for diff view actions.
pub fn reduce(mut state: DiffViewState, action: &DiffViewAction) -> DiffViewState {
    match action {
        // === Selection lifecycle ===
        DiffViewAction::Reset(file) => {
            log::debug!("Diff view reset for {}", file);
            DiffViewState {
                file: Some(file.clone()),
                is_loading: true,
                ..DiffViewState::default()
            }
        }

        DiffViewAction::MetadataReady(metadata) => {
            state.metadata = Some(metadata.clone());
            state
        }

        DiffViewAction::LargeInit { hunk_count } => {
            state.body = DiffBody::Chunked(vec![None; *hunk_count]);
            state.loaded.clear();
            state.loading.clear();
            state
        }

        DiffViewAction::ContentReady(content) => {
            state.body = DiffBody::Full(content.clone());
            state.loaded.clear();
            state.loading.clear();
            state
        }

        DiffViewAction::LoadError(error) => {
            state.error = Some(error.clone());
            state
        }

        DiffViewAction::LoadFinished => {
            state.is_loading = false;
            state
        }

        // === Renderer input ===
        DiffViewAction::SelectLine(selection) => {
            state.selection = Some(*selection);
            state
        }

        // === Hunk range loading ===
        DiffViewAction::RangeLoading(indices) => {
            let Some(hunk_count) = state.chunked_len() else {
                log::debug!("RangeLoading ignored: no hunk slots allocated");
                return state;
            };
            state
                .loading
                .extend(indices.iter().copied().filter(|&i| i < hunk_count));
            state
        }

        DiffViewAction::RangeLoaded { start_index, hunks } => {
            let DiffBody::Chunked(ref mut slots) = state.body else {
                log::debug!("RangeLoaded ignored: no hunk slots allocated");
                return state;
            };
            for (offset, hunk) in hunks.iter().enumerate() {
                let index = start_index + offset;
                let Some(slot) = slots.get_mut(index) else {
                    log::warn!(
                        "RangeLoaded: hunk index {} outside of {} slots, dropping",
                        index,
                        slots.len()
                    );
                    break;
                };
                *slot = Some(hunk.clone());
                state.loaded.insert(index);
                // A wider request may land before the one that reserved this slot
                state.loading.remove(&index);
            }
            state
        }

        DiffViewAction::RangeLoadDone(indices) => {
            for index in indices {
                state.loading.remove(index);
            }
            state
        }
    }
}
