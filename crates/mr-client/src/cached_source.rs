//! Cached diff data source (decorator pattern)
//!
//! Wraps any `DiffDataSource` to add caching behavior.
//! The cache mode determines whether to read from cache, write to cache, or both.

use crate::cache::ResponseCache;
use crate::cache_mode::CacheMode;
use async_trait::async_trait;
use log::debug;
use mr_diff_core::{DiffContent, DiffDataSource, DiffMetadata, FileRef, HunkRange, SourceError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cached data source using the decorator pattern
///
/// Wraps an inner `DiffDataSource` and caches successful responses based on
/// the configured `CacheMode`. Failures are never cached.
///
/// # Cache Modes
///
/// - `CacheMode::None` - Pass through to inner source (no caching)
/// - `CacheMode::WriteOnly` - Skip cache reads, but write responses (force refresh)
/// - `CacheMode::ReadOnly` - Read from cache only, don't update cache
/// - `CacheMode::ReadWrite` - Full caching (default)
///
/// # Example
///
/// ```rust,ignore
/// use mr_client::{CachedDiffSource, CacheMode, PatchDiffSource, ResponseCache};
/// use std::sync::{Arc, Mutex};
///
/// let inner = PatchDiffSource::from_patch(42, &patch, &config.diff)?;
/// let cache = Arc::new(Mutex::new(ResponseCache::in_memory()));
/// let source = CachedDiffSource::new(inner, cache, CacheMode::ReadWrite);
/// ```
#[derive(Debug, Clone)]
pub struct CachedDiffSource<S: DiffDataSource + Clone> {
    inner: S,
    cache: Arc<Mutex<ResponseCache>>,
    mode: CacheMode,
}

impl<S: DiffDataSource + Clone> CachedDiffSource<S> {
    pub fn new(inner: S, cache: Arc<Mutex<ResponseCache>>, mode: CacheMode) -> Self {
        Self { inner, cache, mode }
    }

    /// Create a new source with a different cache mode, sharing the cache
    ///
    /// Useful for a "force refresh" source without rebuilding the inner one.
    pub fn with_mode(&self, mode: CacheMode) -> CachedDiffSource<S> {
        CachedDiffSource {
            inner: self.inner.clone(),
            cache: Arc::clone(&self.cache),
            mode,
        }
    }

    /// Drop every cached response belonging to one merge request
    ///
    /// Call after the merge request received new commits.
    pub fn invalidate_merge_request(&self, merge_request: u64) -> usize {
        let pattern = format!("/mr/{}/", merge_request);
        self.lock_cache().invalidate_pattern(&pattern)
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_cache_get<T: DeserializeOwned>(&self, url: &str, params: &[(&str, &str)]) -> Option<T> {
        if !self.mode.should_read() {
            return None;
        }

        let body = self.lock_cache().get("GET", url, params)?.body;
        match serde_json::from_str(&body) {
            Ok(value) => {
                debug!("Cache HIT for {}", url);
                Some(value)
            }
            Err(e) => {
                debug!("Cache parse error for {}: {}", url, e);
                None
            }
        }
    }

    fn cache_set<T: Serialize>(&self, url: &str, params: &[(&str, &str)], value: &T) {
        if !self.mode.should_write() {
            return;
        }

        match serde_json::to_string(value) {
            Ok(json) => self.lock_cache().set("GET", url, params, &json),
            Err(e) => debug!("Failed to write to cache: {}", e),
        }
    }

    /// Read-through: serve from cache, otherwise run `fetch` and store its result
    async fn cached<T, F>(&self, url: &str, params: &[(&str, &str)], fetch: F) -> Result<T, SourceError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Future<Output = Result<T, SourceError>> + Send,
    {
        if let Some(value) = self.try_cache_get(url, params) {
            return Ok(value);
        }

        debug!("Cache MISS for {}", url);
        let value = fetch.await?;
        self.cache_set(url, params, &value);
        Ok(value)
    }
}

#[async_trait]
impl<S: DiffDataSource + Clone> DiffDataSource for CachedDiffSource<S> {
    async fn get_metadata(&self, file: &FileRef) -> Result<DiffMetadata, SourceError> {
        let url = format!("/mr/{}/metadata", file.merge_request);
        let params = [("path", file.path.as_str())];
        self.cached(&url, &params, self.inner.get_metadata(file))
            .await
    }

    async fn get_full_diff(&self, file: &FileRef) -> Result<DiffContent, SourceError> {
        let url = format!("/mr/{}/diff", file.merge_request);
        let params = [("path", file.path.as_str())];
        self.cached(&url, &params, self.inner.get_full_diff(file))
            .await
    }

    async fn get_hunk_range(
        &self,
        file: &FileRef,
        start_index: usize,
        count: usize,
    ) -> Result<HunkRange, SourceError> {
        let url = format!("/mr/{}/hunks", file.merge_request);
        let start = start_index.to_string();
        let count_param = count.to_string();
        let params = [
            ("path", file.path.as_str()),
            ("start", start.as_str()),
            ("count", count_param.as_str()),
        ];
        self.cached(
            &url,
            &params,
            self.inner.get_hunk_range(file, start_index, count),
        )
        .await
    }
}
