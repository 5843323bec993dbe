//! Diff data sources with caching support
//!
//! Implementations of [`mr_diff_core::DiffDataSource`]. Caching is a
//! decorator, so it composes with any source.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              DiffDataSource trait               │
//! │  - get_metadata()                               │
//! │  - get_full_diff()                              │
//! │  - get_hunk_range()                             │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │ PatchDiffSource │         │  CachedDiffSource   │
//! │ (raw patch)     │◄────────│  (decorator)        │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use mr_client::{CacheMode, CachedDiffSource, PatchDiffSource, ResponseCache};
//! use mr_diff_core::{DiffDataSource, FileRef};
//! use mr_review_config::DiffLoadingConfig;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example(patch: &str) -> anyhow::Result<()> {
//! let config = DiffLoadingConfig::default();
//! let inner = PatchDiffSource::from_patch(42, patch, &config)?;
//!
//! let cache = Arc::new(Mutex::new(ResponseCache::in_memory()));
//! let source = CachedDiffSource::new(inner, cache, CacheMode::ReadWrite);
//!
//! let metadata = source.get_metadata(&FileRef::new(42, "src/main.rs")).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cache_mode;
pub mod cached_source;
pub mod patch_source;

pub use cache::{CacheStats, CachedResponse, ResponseCache};
pub use cache_mode::CacheMode;
pub use cached_source::CachedDiffSource;
pub use patch_source::PatchDiffSource;
