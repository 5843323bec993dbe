//! Metadata probe: decides how a freshly selected file gets loaded.

use super::{HunkRangeLoader, LoadContext};
use crate::action::DiffViewAction;
use crate::error::DiffLoadError;
use crate::model::FileRef;
use log::{debug, error, info};

/// Runs once per selection.
///
/// Small diffs are fetched whole. Large diffs get one empty slot per hunk and
/// their first batch is fetched before the probe reports completion.
#[derive(Clone)]
pub struct MetadataProber {
    ctx: LoadContext,
    ranges: HunkRangeLoader,
}

impl MetadataProber {
    pub fn new(ctx: LoadContext) -> Self {
        let ranges = HunkRangeLoader::new(ctx.clone());
        Self { ctx, ranges }
    }

    /// Probe `file` for selection `generation` in the background.
    pub fn spawn(&self, generation: u64, file: FileRef) {
        let prober = self.clone();
        self.ctx.tasks.spawn(async move {
            prober.probe(generation, file).await;
        });
    }

    /// Classify `file` and load it. Always ends with `LoadFinished` unless the
    /// selection went stale along the way.
    pub async fn probe(&self, generation: u64, file: FileRef) {
        self.load(generation, &file).await;
        self.ctx.dispatch_for(generation, DiffViewAction::LoadFinished);
    }

    async fn load(&self, generation: u64, file: &FileRef) {
        let metadata = match self.ctx.source.get_metadata(file).await {
            Ok(metadata) => metadata,
            Err(e) => {
                self.fail(generation, file, e.to_string());
                return;
            }
        };

        let is_large = metadata.is_large;
        let hunk_count = metadata.hunk_count;
        info!(
            "{}: {} hunks, {} lines, {}",
            file,
            hunk_count,
            metadata.total_lines,
            if is_large { "chunked" } else { "whole" }
        );
        if !self
            .ctx
            .dispatch_for(generation, DiffViewAction::MetadataReady(metadata))
        {
            return;
        }

        if is_large {
            self.load_initial_batch(generation, hunk_count).await;
        } else {
            self.load_whole(generation, file).await;
        }
    }

    async fn load_initial_batch(&self, generation: u64, hunk_count: usize) {
        if !self
            .ctx
            .dispatch_for(generation, DiffViewAction::LargeInit { hunk_count })
        {
            return;
        }

        let batch_size = self.ctx.config.batch_size;
        match self.ranges.reserve(generation, 0, batch_size) {
            Some(fetch) => fetch.run().await,
            None => debug!("Initial batch has nothing to fetch"),
        }
    }

    async fn load_whole(&self, generation: u64, file: &FileRef) {
        match self.ctx.source.get_full_diff(file).await {
            Ok(content) => {
                self.ctx
                    .dispatch_for(generation, DiffViewAction::ContentReady(content));
            }
            Err(e) => self.fail(generation, file, e.to_string()),
        }
    }

    fn fail(&self, generation: u64, file: &FileRef, reason: String) {
        let error = DiffLoadError::MetadataFetchFailed {
            file: file.to_string(),
            reason,
        };
        error!("{}", error);
        self.ctx
            .dispatch_for(generation, DiffViewAction::LoadError(error));
    }
}
