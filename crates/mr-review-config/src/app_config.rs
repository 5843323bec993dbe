//! Application configuration
//!
//! Configuration loaded from .mr-review.toml file.

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Application configuration loaded from .mr-review.toml
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Progressive diff loading knobs
    #[serde(default)]
    pub diff: DiffLoadingConfig,

    /// Response cache behaviour
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Tuning for the progressive diff loader.
///
/// Hunks are never measured individually, so `estimated_hunk_height` is the
/// only link between a scroll offset and a hunk index.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DiffLoadingConfig {
    /// Number of hunks requested when a large diff is first opened
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Approximate rendered height of one hunk, in renderer scroll units
    #[serde(default = "default_estimated_hunk_height")]
    pub estimated_hunk_height: f64,

    /// Hunks assumed to fit in the viewport
    #[serde(default = "default_visible_hunks")]
    pub visible_hunks: usize,

    /// Extra hunks prefetched on each side of the viewport
    #[serde(default = "default_prefetch_buffer")]
    pub prefetch_buffer: usize,

    /// A diff with at least this many hunks is loaded in chunks
    #[serde(default = "default_large_hunk_threshold")]
    pub large_hunk_threshold: usize,

    /// A diff with at least this many lines is loaded in chunks
    #[serde(default = "default_large_line_threshold")]
    pub large_line_threshold: usize,
}

fn default_batch_size() -> usize {
    20
}

fn default_estimated_hunk_height() -> f64 {
    120.0
}

fn default_visible_hunks() -> usize {
    10
}

fn default_prefetch_buffer() -> usize {
    10
}

fn default_large_hunk_threshold() -> usize {
    50
}

fn default_large_line_threshold() -> usize {
    2000
}

impl Default for DiffLoadingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            estimated_hunk_height: default_estimated_hunk_height(),
            visible_hunks: default_visible_hunks(),
            prefetch_buffer: default_prefetch_buffer(),
            large_hunk_threshold: default_large_hunk_threshold(),
            large_line_threshold: default_large_line_threshold(),
        }
    }
}

impl DiffLoadingConfig {
    /// Number of hunk indices prefetched on either side of the visible estimate
    pub fn prefetch_radius(&self) -> usize {
        self.visible_hunks + self.prefetch_buffer
    }

    /// Whether a diff of the given size should take the chunked path
    pub fn is_large(&self, hunk_count: usize, total_lines: usize) -> bool {
        hunk_count >= self.large_hunk_threshold || total_lines >= self.large_line_threshold
    }
}

/// Response cache settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Cache metadata, whole-file diffs and hunk ranges in memory
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Write the cache to the cache directory on exit and reload it on start
    #[serde(default)]
    pub persist: bool,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            persist: false,
        }
    }
}

impl AppConfig {
    /// Load config from the first `.mr-review.toml` found, or use defaults
    pub fn load() -> Self {
        if let Some(file) = crate::load_config_file() {
            match Self::parse(&file.content) {
                Ok(config) => {
                    log::info!("Loaded app config from {}", file.path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {:#}", file.path.display(), e);
                }
            }
        }

        log::debug!("Using default app config");
        Self::default()
    }

    /// Parse TOML config content
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.diff.batch_size, 20);
        assert_eq!(config.diff.visible_hunks, 10);
        assert_eq!(config.diff.prefetch_buffer, 10);
        assert_eq!(config.diff.prefetch_radius(), 20);
        assert!(config.cache.enabled);
        assert!(!config.cache.persist);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [diff]
            batch_size = 40
            estimated_hunk_height = 80.5

            [cache]
            persist = true
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.diff.batch_size, 40);
        assert_eq!(config.diff.estimated_hunk_height, 80.5);
        // untouched keys keep their defaults
        assert_eq!(config.diff.visible_hunks, 10);
        assert!(config.cache.enabled);
        assert!(config.cache.persist);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(AppConfig::parse("[diff]\nbatch_size = \"many\"\n").is_err());
    }

    #[test]
    fn test_is_large_thresholds() {
        let config = DiffLoadingConfig::default();
        assert!(!config.is_large(3, 40));
        assert!(config.is_large(50, 40));
        assert!(config.is_large(2, 2000));
    }
}
