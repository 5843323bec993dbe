//! Data models for diff representation.

mod diff;

pub use diff::{
    DiffContent, DiffLine, DiffMetadata, FileDiff, FileRef, FileStatus, Hunk, HunkRange, LineKind,
};
