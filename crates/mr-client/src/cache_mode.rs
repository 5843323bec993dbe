//! Cache mode for the caching data source decorator

use std::fmt;
use std::str::FromStr;

/// Cache behavior mode for data sources
///
/// Set at construction time, not per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// No caching - neither read nor write
    None,

    /// Write-only - skip cache reads, but write responses to cache
    /// Use for "force refresh" to get fresh data while populating cache
    WriteOnly,

    /// Read-only - read from cache, but don't update it
    ReadOnly,

    /// Full caching - read from cache, write to cache
    #[default]
    ReadWrite,
}

impl CacheMode {
    /// Should we attempt to read from cache before asking the source?
    pub fn should_read(&self) -> bool {
        matches!(self, CacheMode::ReadOnly | CacheMode::ReadWrite)
    }

    /// Should we write responses to cache?
    pub fn should_write(&self) -> bool {
        matches!(self, CacheMode::WriteOnly | CacheMode::ReadWrite)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::None => "none",
            CacheMode::WriteOnly => "write-only",
            CacheMode::ReadOnly => "read-only",
            CacheMode::ReadWrite => "read-write",
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "off" => Ok(CacheMode::None),
            "write-only" | "refresh" => Ok(CacheMode::WriteOnly),
            "read-only" | "offline" => Ok(CacheMode::ReadOnly),
            "read-write" => Ok(CacheMode::ReadWrite),
            other => anyhow::bail!("Unknown cache mode '{}'", other),
        }
    }
}
