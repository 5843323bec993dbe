//! Trait for the remote side that serves diff data.

use crate::model::{DiffContent, DiffMetadata, FileRef, HunkRange};
use async_trait::async_trait;
use thiserror::Error;

/// Errors a data source can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The requested file is not part of the merge request.
    #[error("File not found: {0}")]
    NotFound(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(String),

    /// The requested hunk range starts past the end of the diff.
    #[error("Invalid hunk range {start}+{count} for {path} ({hunk_count} hunks)")]
    InvalidRange {
        path: String,
        start: usize,
        count: usize,
        hunk_count: usize,
    },

    /// The diff could not be parsed.
    #[error("Failed to parse diff: {0}")]
    Parse(String),
}

/// Serves metadata, whole-file diffs and hunk ranges for merge request files.
///
/// The loader never talks to a transport directly; implement this trait to
/// plug in an API client, a local patch, or a cache in front of either.
///
/// # Example
///
/// ```ignore
/// struct ApiSource {
///     client: ReviewApiClient,
/// }
///
/// #[async_trait]
/// impl DiffDataSource for ApiSource {
///     async fn get_metadata(&self, file: &FileRef) -> Result<DiffMetadata, SourceError> {
///         self.client
///             .diff_metadata(file.merge_request, &file.path)
///             .await
///             .map_err(|e| SourceError::Network(e.to_string()))
///     }
///     // ...
/// }
/// ```
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; fetches for one session run as
/// independent tokio tasks.
#[async_trait]
pub trait DiffDataSource: Send + Sync {
    /// Classify the file's diff as small or large.
    async fn get_metadata(&self, file: &FileRef) -> Result<DiffMetadata, SourceError>;

    /// Fetch the whole diff in one call. Only used for small diffs.
    async fn get_full_diff(&self, file: &FileRef) -> Result<DiffContent, SourceError>;

    /// Fetch up to `count` hunks starting at `start_index`.
    ///
    /// The response may be shorter than requested at the end of the diff.
    async fn get_hunk_range(
        &self,
        file: &FileRef,
        start_index: usize,
        count: usize,
    ) -> Result<HunkRange, SourceError>;
}
