//! Errors produced while loading a file diff.

use thiserror::Error;

/// Failure of one step of the loading pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiffLoadError {
    /// Classification or whole-file fetch failed. Terminal for the selection;
    /// recovery means selecting the file again.
    #[error("Failed to load diff for {file}: {reason}")]
    MetadataFetchFailed { file: String, reason: String },

    /// A hunk range could not be fetched. Logged only; the affected slots stay
    /// absent and are picked up again by the next overlapping prefetch.
    #[error("Failed to load hunks {start}..{end} of {file}: {reason}")]
    RangeFetchFailed {
        file: String,
        start: usize,
        end: usize,
        reason: String,
    },
}

impl DiffLoadError {
    /// Whether this error ends the current selection's pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DiffLoadError::MetadataFetchFailed { .. })
    }
}
