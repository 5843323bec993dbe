//! # mr-diff-core
//!
//! Progressive diff loading for merge request reviews: open arbitrarily large
//! file diffs without blocking the caller or fetching a hunk twice.
//!
//! ## Design Principles
//!
//! This crate is **instrumented**: it never talks to a server itself. Diff data
//! comes from a [`DiffDataSource`] implementation and everything learned about
//! the selected file lands in one [`DiffViewState`], which a renderer reads.
//!
//! - Small diffs are fetched whole in a single call
//! - Large diffs get one empty slot per hunk and are filled batch by batch,
//!   driven by the renderer's scroll position
//! - A slot is never requested twice while a fetch for it is in flight
//!
//! ## Action-Based Architecture
//!
//! The state only changes through [`DiffViewAction`]s run through the pure
//! [`reduce`] function. Async loaders dispatch actions tagged with the
//! generation of the selection they serve; once the user selects another file,
//! late results are dropped instead of leaking into the new view.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mr_diff_core::{DiffSession, FileRef};
//!
//! let session = DiffSession::new(source, config.diff.clone(), runtime.handle().clone());
//! session.select_file(FileRef::new(42, "src/main.rs"));
//!
//! // Renderer input
//! session.on_scroll(scroll_offset);
//! session.on_line_click(hunk_index, line_index);
//!
//! // Renderer output
//! let snapshot = session.snapshot();
//! for (index, hunk) in snapshot.effective_hunks.iter().enumerate() {
//!     // paint the hunk, or a placeholder while it is absent
//! }
//! ```

pub mod action;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod reducer;
pub mod session;
pub mod state;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use action::DiffViewAction;
pub use error::DiffLoadError;
pub use loader::{plan_range, prefetch_window, HunkRangeLoader, MetadataProber, PrefetchScheduler};
pub use model::{
    DiffContent, DiffLine, DiffMetadata, FileDiff, FileRef, FileStatus, Hunk, HunkRange, LineKind,
};
pub use parser::{parse_unified_diff, ParseError};
pub use reducer::reduce;
pub use session::DiffSession;
pub use state::{DiffBody, DiffSnapshot, DiffViewState, LineSelection};
pub use store::{DiffStore, SharedStore};
pub use traits::{DiffDataSource, SourceError};
