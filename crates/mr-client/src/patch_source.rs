//! Data source serving a merge request from a raw unified diff.

use async_trait::async_trait;
use log::{debug, info};
use mr_diff_core::{
    parse_unified_diff, DiffContent, DiffDataSource, DiffMetadata, FileDiff, FileRef, HunkRange,
    SourceError,
};
use mr_review_config::DiffLoadingConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Serves one merge request's files out of its patch text.
///
/// Files are classified with the configured large-diff thresholds, so the
/// loader sees the same small/large split a review server would report.
#[derive(Debug, Clone)]
pub struct PatchDiffSource {
    merge_request: u64,
    files: Arc<HashMap<String, FileDiff>>,
    /// Paths in patch order
    order: Arc<Vec<String>>,
    config: DiffLoadingConfig,
}

impl PatchDiffSource {
    /// Parse `patch` as merge request `merge_request`.
    pub fn from_patch(
        merge_request: u64,
        patch: &str,
        config: &DiffLoadingConfig,
    ) -> Result<Self, SourceError> {
        let parsed = parse_unified_diff(patch).map_err(|e| SourceError::Parse(e.to_string()))?;

        let order: Vec<String> = parsed.iter().map(|f| f.path.clone()).collect();
        let files: HashMap<String, FileDiff> =
            parsed.into_iter().map(|f| (f.path.clone(), f)).collect();
        info!("Patch for !{} has {} files", merge_request, files.len());

        Ok(Self {
            merge_request,
            files: Arc::new(files),
            order: Arc::new(order),
            config: config.clone(),
        })
    }

    /// Changed file paths, in patch order
    pub fn paths(&self) -> &[String] {
        &self.order
    }

    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files.get(path)
    }

    fn lookup(&self, file: &FileRef) -> Result<&FileDiff, SourceError> {
        if file.merge_request != self.merge_request {
            return Err(SourceError::NotFound(file.to_string()));
        }
        self.files
            .get(&file.path)
            .ok_or_else(|| SourceError::NotFound(file.to_string()))
    }
}

#[async_trait]
impl DiffDataSource for PatchDiffSource {
    async fn get_metadata(&self, file: &FileRef) -> Result<DiffMetadata, SourceError> {
        let diff = self.lookup(file)?;
        let hunk_count = diff.hunks.len();
        let total_lines = diff.total_lines();

        Ok(DiffMetadata {
            file_path: diff.path.clone(),
            is_large: self.config.is_large(hunk_count, total_lines),
            hunk_count,
            total_lines,
        })
    }

    async fn get_full_diff(&self, file: &FileRef) -> Result<DiffContent, SourceError> {
        let diff = self.lookup(file)?;
        Ok(DiffContent {
            file_path: diff.path.clone(),
            old_content: diff.old_content(),
            new_content: diff.new_content(),
            hunks: diff.hunks.clone(),
        })
    }

    async fn get_hunk_range(
        &self,
        file: &FileRef,
        start_index: usize,
        count: usize,
    ) -> Result<HunkRange, SourceError> {
        let diff = self.lookup(file)?;
        let hunk_count = diff.hunks.len();
        if count > 0 && start_index >= hunk_count {
            return Err(SourceError::InvalidRange {
                path: diff.path.clone(),
                start: start_index,
                count,
                hunk_count,
            });
        }

        let end = start_index.saturating_add(count).min(hunk_count);
        debug!("Serving hunks {}..{} of {}", start_index, end, file);
        Ok(HunkRange {
            start_index,
            hunks: diff.hunks[start_index.min(end)..end].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    /// One file with `hunks` single-line hunks, 10 lines apart
    fn patch(path: &str, hunks: usize) -> String {
        let mut out = format!(
            "diff --git a/{path} b/{path}\nindex 1111111..2222222 100644\n--- a/{path}\n+++ b/{path}\n"
        );
        for i in 0..hunks {
            let line = i * 10 + 1;
            writeln!(out, "@@ -{line},1 +{line},1 @@").unwrap();
            writeln!(out, "-old {i}").unwrap();
            writeln!(out, "+new {i}").unwrap();
        }
        out
    }

    fn config() -> DiffLoadingConfig {
        DiffLoadingConfig {
            large_hunk_threshold: 5,
            ..DiffLoadingConfig::default()
        }
    }

    fn source() -> PatchDiffSource {
        let text = format!("{}{}", patch("small.rs", 2), patch("big.rs", 8));
        PatchDiffSource::from_patch(7, &text, &config()).unwrap()
    }

    #[tokio::test]
    async fn test_metadata_classifies_by_threshold() {
        let source = source();
        assert_eq!(source.paths(), ["small.rs".to_string(), "big.rs".to_string()]);

        let small = source.get_metadata(&FileRef::new(7, "small.rs")).await.unwrap();
        assert!(!small.is_large);
        assert_eq!(small.hunk_count, 2);
        assert_eq!(small.total_lines, 4);

        let big = source.get_metadata(&FileRef::new(7, "big.rs")).await.unwrap();
        assert!(big.is_large);
        assert_eq!(big.hunk_count, 8);
    }

    #[tokio::test]
    async fn test_full_diff() {
        let content = source()
            .get_full_diff(&FileRef::new(7, "small.rs"))
            .await
            .unwrap();
        assert_eq!(content.hunks.len(), 2);
        assert_eq!(content.old_content, "old 0\nold 1\n");
        assert_eq!(content.new_content, "new 0\nnew 1\n");
    }

    #[tokio::test]
    async fn test_hunk_range_is_clamped() {
        let source = source();
        let file = FileRef::new(7, "big.rs");

        let range = source.get_hunk_range(&file, 2, 3).await.unwrap();
        assert_eq!(range.start_index, 2);
        assert_eq!(range.hunks.len(), 3);
        assert_eq!(range.hunks[0].lines[1].content, "new 2");

        let tail = source.get_hunk_range(&file, 6, 20).await.unwrap();
        assert_eq!(tail.hunks.len(), 2);

        assert!(matches!(
            source.get_hunk_range(&file, 8, 1).await,
            Err(SourceError::InvalidRange { hunk_count: 8, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_files() {
        let source = source();
        assert!(matches!(
            source.get_metadata(&FileRef::new(7, "nope.rs")).await,
            Err(SourceError::NotFound(_))
        ));
        assert!(matches!(
            source.get_metadata(&FileRef::new(8, "big.rs")).await,
            Err(SourceError::NotFound(_))
        ));
    }
}
