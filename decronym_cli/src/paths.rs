//! Centralized path management for the decronym CLI
//!
//! Default locations are computed here once and handed to the core as
//! explicit settings.

use std::path::PathBuf;

/// The name of the application directory used across all platforms
const APP_DIR: &str = "decronym";

/// The name of the cache subdirectory
const CACHE_SUBDIR: &str = "cache";

/// The name of the configuration file
const CONFIG_FILE: &str = "config.toml";

/// Returns the base data directory for the application
///
/// On Linux this is `~/.local/share/decronym`, on macOS
/// `~/Library/Application Support/decronym` and on Windows
/// `%APPDATA%/decronym`. Falls back to `.decronym` in the current directory.
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".decronym"))
}

/// Returns the default directory holding one cache file per provider
pub fn get_cache_dir() -> PathBuf {
    get_data_dir().join(CACHE_SUBDIR)
}

/// Returns the configuration directory
///
/// Honors `XDG_CONFIG_HOME` on Unix-like systems.
pub fn get_config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join(APP_DIR);
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".decronym"))
}

/// Returns the default configuration file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_is_under_data_dir() {
        let cache_dir = get_cache_dir();
        assert!(cache_dir.starts_with(get_data_dir()));
        assert_eq!(
            cache_dir.file_name().and_then(|n| n.to_str()),
            Some(CACHE_SUBDIR)
        );
    }

    #[test]
    fn test_config_path_is_in_config_dir() {
        let config_path = get_config_path();
        assert!(config_path.starts_with(get_config_dir()));
        assert_eq!(
            config_path.file_name().and_then(|n| n.to_str()),
            Some(CONFIG_FILE)
        );
    }

    #[test]
    fn test_all_paths_use_app_dir() {
        for path in [get_data_dir(), get_cache_dir(), get_config_dir()] {
            assert!(
                path.to_string_lossy().contains(APP_DIR),
                "path should contain '{APP_DIR}': {}",
                path.display()
            );
        }
    }
}
