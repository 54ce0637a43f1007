//! Per-provider result caching
//!
//! Every provider owns one [`CacheStore`], persisted as a single JSON file
//! named after the MD5 digest of the provider's location. The store only
//! touches disk when its serialized content actually changed.

pub mod store;

pub use store::CacheStore;

use crate::error::{IoError, Result};
use md5::{Digest as Md5Digest, Md5};
use std::path::{Path, PathBuf};

/// Extension used by cache files
pub const CACHE_FILE_EXTENSION: &str = "json";

/// Content-addressed cache file path for a provider location
pub fn cache_path_for(cache_dir: &Path, cache_key: &str) -> PathBuf {
    cache_dir.join(format!("{}.{CACHE_FILE_EXTENSION}", hex_digest(cache_key.as_bytes())))
}

/// Lowercase hex MD5 of `data`
pub(crate) fn hex_digest(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

/// Remove every cache file in `cache_dir`
///
/// Returns the number of files removed. A missing directory is not an error.
pub fn clear_cache_dir(cache_dir: &Path) -> Result<usize> {
    if !cache_dir.exists() {
        return Ok(0);
    }

    let entries =
        std::fs::read_dir(cache_dir).map_err(|e| IoError::from_std(e).with_path(cache_dir))?;

    let mut removed = 0;
    for entry in entries {
        let path = entry
            .map_err(|e| IoError::from_std(e).with_path(cache_dir))?
            .path();
        let is_cache_file = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == CACHE_FILE_EXTENSION);

        if is_cache_file {
            std::fs::remove_file(&path).map_err(|e| IoError::from_std(e).with_path(&path))?;
            log::debug!("Removed cache file {}", path.display());
            removed += 1;
        }
    }

    Ok(removed)
}
