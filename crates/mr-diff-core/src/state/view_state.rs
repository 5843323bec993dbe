//! The record holding everything known about the selected file's diff.

use super::LineSelection;
use crate::error::DiffLoadError;
use crate::model::{DiffContent, DiffLine, DiffMetadata, FileRef, Hunk};
use std::collections::BTreeSet;

/// Where the hunks of the selected file come from.
///
/// A selection is on exactly one path once classified; the enum makes holding
/// both whole content and hunk slots unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiffBody {
    /// Not classified yet (or the probe failed)
    #[default]
    Pending,
    /// Small diff, loaded in one call
    Full(DiffContent),
    /// Large diff: one slot per hunk, `None` until fetched. Never resized.
    Chunked(Vec<Option<Hunk>>),
}

/// State of the diff view for the currently selected file.
///
/// Only the reducer mutates this; everything else reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffViewState {
    /// File the state belongs to
    pub file: Option<FileRef>,
    pub metadata: Option<DiffMetadata>,
    pub body: DiffBody,
    /// Slot indices holding a fetched hunk
    pub loaded: BTreeSet<usize>,
    /// Slot indices with a fetch in flight
    pub loading: BTreeSet<usize>,
    /// Terminal error for this selection
    pub error: Option<DiffLoadError>,
    pub selection: Option<LineSelection>,
    /// True from selection until the probe finishes
    pub is_loading: bool,
}

impl DiffViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hunks on the active path (0 before classification).
    pub fn hunk_count(&self) -> usize {
        match &self.body {
            DiffBody::Pending => 0,
            DiffBody::Full(content) => content.hunks.len(),
            DiffBody::Chunked(slots) => slots.len(),
        }
    }

    /// Slot count if the chunked path is active.
    pub fn chunked_len(&self) -> Option<usize> {
        match &self.body {
            DiffBody::Chunked(slots) => Some(slots.len()),
            _ => None,
        }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.body, DiffBody::Chunked(_))
    }

    pub fn content(&self) -> Option<&DiffContent> {
        match &self.body {
            DiffBody::Full(content) => Some(content),
            _ => None,
        }
    }

    /// Hunks as the renderer sees them, regardless of the loading path.
    ///
    /// Whole content yields every hunk present; the chunked path yields `None`
    /// for slots that have not been fetched yet.
    pub fn effective_hunks(&self) -> Vec<Option<&Hunk>> {
        match &self.body {
            DiffBody::Pending => Vec::new(),
            DiffBody::Full(content) => content.hunks.iter().map(Some).collect(),
            DiffBody::Chunked(slots) => slots.iter().map(Option::as_ref).collect(),
        }
    }

    /// Hunk at `index` if it is available.
    pub fn hunk(&self, index: usize) -> Option<&Hunk> {
        match &self.body {
            DiffBody::Pending => None,
            DiffBody::Full(content) => content.hunks.get(index),
            DiffBody::Chunked(slots) => slots.get(index).and_then(Option::as_ref),
        }
    }

    /// The selected line, once its hunk is available.
    pub fn selected_line(&self) -> Option<&DiffLine> {
        let selection = self.selection?;
        self.hunk(selection.hunk_index)?
            .lines
            .get(selection.line_index)
    }

    /// Owned copy of the renderer-facing projection.
    pub fn snapshot(&self) -> DiffSnapshot {
        DiffSnapshot {
            file: self.file.clone(),
            metadata: self.metadata.clone(),
            effective_hunks: self.effective_hunks().into_iter().map(|h| h.cloned()).collect(),
            loading_indices: self.loading.clone(),
            selection: self.selection,
            error: self.error.clone(),
            is_loading: self.is_loading,
        }
    }
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffSnapshot {
    pub file: Option<FileRef>,
    pub metadata: Option<DiffMetadata>,
    pub effective_hunks: Vec<Option<Hunk>>,
    pub loading_indices: BTreeSet<usize>,
    pub selection: Option<LineSelection>,
    pub error: Option<DiffLoadError>,
    pub is_loading: bool,
}

impl DiffSnapshot {
    /// Number of slots still waiting for data.
    pub fn absent_count(&self) -> usize {
        self.effective_hunks.iter().filter(|h| h.is_none()).count()
    }
}
