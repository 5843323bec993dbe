//! Configuration and file management for mr-review
//!
//! This crate provides:
//! - Cache file path utilities
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig) including the diff loading knobs

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::{AppConfig, CacheConfig, DiffLoadingConfig};
pub use config_file::{load_config_file, ConfigFile, CONFIG_ENV};
pub use paths::{cache_dir, response_cache_path};
