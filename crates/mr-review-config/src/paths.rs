//! Cache directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.cache/mr-review/`
//! - macOS: `~/Library/Caches/mr-review/`
//! - Windows: `%LOCALAPPDATA%\mr-review\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "mr-review";
const RESPONSE_CACHE_FILE: &str = "diff-cache.json";

/// Get the application cache directory, creating it if needed
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    Ok(dir)
}

/// Get path to the persisted diff response cache
pub fn response_cache_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join(RESPONSE_CACHE_FILE))
}
