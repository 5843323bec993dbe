//! Response cache for diff data sources
//!
//! Stores serialized responses keyed by method, url and request parameters.
//! Optionally backed by a JSON file so a later run can start warm.

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A cached response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// Serialized JSON body
    pub body: String,
    pub cached_at: DateTime<Utc>,
}

/// Hit/miss counters and entry count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CachedResponse>,
    /// Backing file; `None` keeps the cache in memory only
    path: Option<PathBuf>,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    /// In-memory cache, never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache backed by `path`, loading existing entries if the file exists.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cache file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse cache file {}", path.display()))?
        } else {
            HashMap::new()
        };

        info!(
            "Loaded response cache from {} ({} entries)",
            path.display(),
            entries.len()
        );
        Ok(Self {
            entries,
            path: Some(path),
            ..Self::default()
        })
    }

    /// Like [`load`](Self::load), but starts empty if the file is unreadable.
    pub fn load_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(cache) => cache,
            Err(e) => {
                warn!("{:#}; starting with an empty cache", e);
                Self {
                    path: Some(path),
                    ..Self::default()
                }
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&mut self, method: &str, url: &str, params: &[(&str, &str)]) -> Option<CachedResponse> {
        let key = Self::key(method, url, params);
        match self.entries.get(&key) {
            Some(response) => {
                self.hits += 1;
                Some(response.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn set(&mut self, method: &str, url: &str, params: &[(&str, &str)], body: &str) {
        let key = Self::key(method, url, params);
        self.entries.insert(
            key,
            CachedResponse {
                body: body.to_string(),
                cached_at: Utc::now(),
            },
        );
    }

    /// Drop every entry whose key contains `pattern`. Returns how many went.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        let removed = before - self.entries.len();
        debug!("Invalidated {} cache entries matching '{}'", removed, pattern);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Write all entries to the backing file, if there is one.
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string(&self.entries).context("Failed to serialize cache")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;
        debug!("Saved {} cache entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// `"<method> <url> [[name, value], ...]"`; params are JSON so values
    /// containing `&` or `=` stay unambiguous
    fn key(method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let params: Value = params
            .iter()
            .map(|&(name, value)| Value::Array(vec![name.into(), value.into()]))
            .collect();
        format!("{} {} {}", method, url, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let mut cache = ResponseCache::in_memory();
        assert!(cache.get("GET", "/mr/1/diff", &[("path", "a.rs")]).is_none());

        cache.set("GET", "/mr/1/diff", &[("path", "a.rs")], "{}");
        let hit = cache.get("GET", "/mr/1/diff", &[("path", "a.rs")]).unwrap();
        assert_eq!(hit.body, "{}");

        // Parameters are part of the key
        assert!(cache.get("GET", "/mr/1/diff", &[("path", "b.rs")]).is_none());
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 2
            }
        );
    }

    #[test]
    fn test_param_values_cannot_forge_other_keys() {
        let mut cache = ResponseCache::in_memory();
        cache.set(
            "GET",
            "/mr/1/hunks",
            &[("path", "a.rs"), ("start", "0"), ("count", "5")],
            "real",
        );

        // A path that spells out the other request's params is its own key
        let forged = [("path", "a.rs&start=0&count=5")];
        assert!(cache.get("GET", "/mr/1/hunks", &forged).is_none());
        cache.set("GET", "/mr/1/hunks", &forged, "forged");

        assert_eq!(
            cache
                .get(
                    "GET",
                    "/mr/1/hunks",
                    &[("path", "a.rs"), ("start", "0"), ("count", "5")]
                )
                .map(|r| r.body),
            Some("real".to_string())
        );
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_invalidate_pattern() {
        let mut cache = ResponseCache::in_memory();
        cache.set("GET", "/mr/1/metadata", &[("path", "a.rs")], "1");
        cache.set("GET", "/mr/1/hunks", &[("path", "a.rs"), ("start", "0")], "2");
        cache.set("GET", "/mr/12/metadata", &[("path", "a.rs")], "3");

        assert_eq!(cache.invalidate_pattern("/mr/1/"), 2);
        assert_eq!(cache.stats().entries, 1);
        assert!(cache.get("GET", "/mr/12/metadata", &[("path", "a.rs")]).is_some());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = ResponseCache::load(&path).unwrap();
        cache.set("GET", "/mr/3/metadata", &[], "{\"x\":1}");
        cache.save().unwrap();

        let mut reloaded = ResponseCache::load(&path).unwrap();
        assert_eq!(reloaded.path(), Some(path.as_path()));
        assert_eq!(
            reloaded.get("GET", "/mr/3/metadata", &[]).map(|r| r.body),
            Some("{\"x\":1}".to_string())
        );
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(ResponseCache::load(&path).is_err());
        let cache = ResponseCache::load_or_empty(&path);
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.path(), Some(path.as_path()));
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        assert!(ResponseCache::in_memory().save().is_ok());
    }
}
