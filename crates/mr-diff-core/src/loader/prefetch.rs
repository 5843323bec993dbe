//! Scroll-driven prefetching for chunked diffs.

use super::{HunkRangeLoader, LoadContext};
use mr_review_config::DiffLoadingConfig;
use std::ops::Range;

/// Hunk indices worth having loaded around `scroll_offset`.
///
/// The visible hunk is estimated from `estimated_hunk_height` and the window
/// extends `prefetch_radius()` hunks to either side, clipped to the diff.
/// Negative offsets count as the top.
pub fn prefetch_window(
    scroll_offset: f64,
    hunk_count: usize,
    config: &DiffLoadingConfig,
) -> Option<Range<usize>> {
    if hunk_count == 0 {
        return None;
    }

    let height = if config.estimated_hunk_height > 0.0 {
        config.estimated_hunk_height
    } else {
        1.0
    };
    // NaN and negative offsets both land on 0
    let estimate = (scroll_offset.max(0.0) / height).floor() as usize;
    let estimate = estimate.min(hunk_count - 1);

    let radius = config.prefetch_radius();
    let start = estimate.saturating_sub(radius);
    let end = estimate.saturating_add(radius).saturating_add(1).min(hunk_count);
    Some(start..end)
}

/// Translates scroll events into range loads for the current selection.
#[derive(Clone)]
pub struct PrefetchScheduler {
    ctx: LoadContext,
    ranges: HunkRangeLoader,
}

impl PrefetchScheduler {
    pub fn new(ctx: LoadContext) -> Self {
        let ranges = HunkRangeLoader::new(ctx.clone());
        Self { ctx, ranges }
    }

    /// React to the renderer scrolling to `scroll_offset`.
    ///
    /// Does nothing unless the current selection is chunked. Returns whether a
    /// fetch was started.
    pub fn on_scroll(&self, scroll_offset: f64) -> bool {
        let (generation, hunk_count) = {
            let store = self.ctx.lock_store();
            match store.state().chunked_len() {
                Some(len) => (store.generation(), len),
                None => return false,
            }
        };

        let Some(window) = prefetch_window(scroll_offset, hunk_count, &self.ctx.config) else {
            return false;
        };
        log::trace!("Scroll {} -> prefetch {:?}", scroll_offset, window);
        self.ranges
            .load_range(generation, window.start, window.end - window.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiffLoadingConfig {
        DiffLoadingConfig::default()
    }

    #[test]
    fn test_window_at_top() {
        assert_eq!(prefetch_window(0.0, 100, &config()), Some(0..21));
    }

    #[test]
    fn test_window_in_the_middle() {
        let height = config().estimated_hunk_height;
        assert_eq!(prefetch_window(45.0 * height, 100, &config()), Some(25..66));
        // Partway into a hunk still estimates that hunk
        assert_eq!(
            prefetch_window(45.5 * height, 100, &config()),
            Some(25..66)
        );
    }

    #[test]
    fn test_window_clipped_at_end() {
        let height = config().estimated_hunk_height;
        assert_eq!(prefetch_window(45.0 * height, 50, &config()), Some(25..50));
        // Scrolling past the end estimates the last hunk
        assert_eq!(prefetch_window(1.0e9, 50, &config()), Some(29..50));
    }

    #[test]
    fn test_window_negative_offset() {
        assert_eq!(prefetch_window(-500.0, 100, &config()), Some(0..21));
    }

    #[test]
    fn test_window_empty_diff() {
        assert_eq!(prefetch_window(0.0, 0, &config()), None);
    }
}
