//! Tagged actions for the diff view state machine.

use crate::error::DiffLoadError;
use crate::model::{DiffContent, DiffMetadata, FileRef, Hunk};
use crate::state::LineSelection;

/// Every transition of [`DiffViewState`](crate::state::DiffViewState).
///
/// Components never mutate state directly; they dispatch one of these to the
/// store and the reducer produces the next state.
#[derive(Debug, Clone)]
pub enum DiffViewAction {
    // === Selection lifecycle ===
    /// A new file was selected: drop everything held for the previous one
    Reset(FileRef),
    /// Size classification arrived
    MetadataReady(DiffMetadata),
    /// Large diff: allocate `hunk_count` empty slots
    LargeInit { hunk_count: usize },
    /// Small diff: install the whole content
    ContentReady(DiffContent),
    /// Terminal failure for the current selection
    LoadError(DiffLoadError),
    /// The probe has finished, successfully or not
    LoadFinished,

    // === Renderer input ===
    /// User clicked a line
    SelectLine(LineSelection),

    // === Hunk range loading ===
    /// These slot indices now have a fetch in flight
    RangeLoading(Vec<usize>),
    /// Hunks fetched for absolute indices `start_index..`
    RangeLoaded { start_index: usize, hunks: Vec<Hunk> },
    /// The fetch for these indices settled (success or failure)
    RangeLoadDone(Vec<usize>),
}

impl DiffViewAction {
    /// Short name for logging, without the payload.
    pub fn name(&self) -> &'static str {
        match self {
            DiffViewAction::Reset(_) => "Reset",
            DiffViewAction::MetadataReady(_) => "MetadataReady",
            DiffViewAction::LargeInit { .. } => "LargeInit",
            DiffViewAction::ContentReady(_) => "ContentReady",
            DiffViewAction::LoadError(_) => "LoadError",
            DiffViewAction::LoadFinished => "LoadFinished",
            DiffViewAction::SelectLine(_) => "SelectLine",
            DiffViewAction::RangeLoading(_) => "RangeLoading",
            DiffViewAction::RangeLoaded { .. } => "RangeLoaded",
            DiffViewAction::RangeLoadDone(_) => "RangeLoadDone",
        }
    }
}
