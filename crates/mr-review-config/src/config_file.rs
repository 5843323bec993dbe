//! Locating and reading `.mr-review.toml`

use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".mr-review.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "MR_REVIEW_CONFIG";

/// A config file that was found and read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub content: String,
}

/// Places searched for the config file, most specific first:
/// `$MR_REVIEW_CONFIG`, the working directory, the home directory.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        candidates.push(PathBuf::from(explicit));
    }
    candidates.push(PathBuf::from(CONFIG_FILE));
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(CONFIG_FILE));
    }
    candidates
}

/// Read the first candidate that exists and is readable
pub fn read_first<P: AsRef<Path>>(candidates: &[P]) -> Option<ConfigFile> {
    candidates.iter().find_map(|candidate| {
        let path = candidate.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("Loaded config from {}", path.display());
                Some(ConfigFile {
                    path: path.to_path_buf(),
                    content,
                })
            }
            Err(_) => None,
        }
    })
}

/// Load the config file from the standard locations, if there is one
pub fn load_config_file() -> Option<ConfigFile> {
    read_first(&config_candidates())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_first_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("present.toml");
        let later = dir.path().join("later.toml");
        std::fs::write(&present, "[diff]\nbatch_size = 5\n").unwrap();
        std::fs::write(&later, "").unwrap();

        let found = read_first(&[missing, present.clone(), later]).unwrap();
        assert_eq!(found.path, present);
        assert!(found.content.contains("batch_size = 5"));
    }

    #[test]
    fn test_read_first_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_first(&[dir.path().join("nope.toml")]).is_none());
    }

    #[test]
    fn test_candidates_include_working_directory() {
        assert!(config_candidates().contains(&PathBuf::from(CONFIG_FILE)));
    }
}
