//! File-backed cache store
//!
//! Maps case-folded acronyms to the records a provider returned for them.
//! Writes are skipped when the serialized content hashes the same as what was
//! last loaded from or written to disk.

use crate::cache::hex_digest;
use crate::error::{IoError, Result, ValidationError};
use crate::record::{Record, fold_key};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Persistent key → records mapping owned by a single provider
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<String, Vec<Record>>,
    /// Digest of the on-disk content as of the last load or save
    digest: Option<String>,
}

impl CacheStore {
    /// Create an empty store bound to `path` without reading it
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
            digest: None,
        }
    }

    /// Create a store and load whatever is on disk at `path`
    pub fn open(path: PathBuf) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    /// Replace the in-memory content with the cache file's content
    ///
    /// A missing, unreadable or malformed file leaves the store empty. The
    /// failure is logged, never returned.
    pub fn load(&mut self) {
        self.entries.clear();
        self.digest = None;

        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No cache file at {}", self.path.display());
                return;
            }
            Err(e) => {
                log::warn!("Failed to read cache {}: {e}", self.path.display());
                return;
            }
        };

        match Self::parse(&raw, &self.path) {
            Ok(entries) => {
                log::debug!(
                    "Loaded {} cached keys from {}",
                    entries.len(),
                    self.path.display()
                );
                self.entries = entries;
                self.digest = Some(hex_digest(&raw));
            }
            Err(e) => {
                log::warn!("Ignoring cache {}: {e}", self.path.display());
            }
        }
    }

    fn parse(raw: &[u8], path: &Path) -> Result<BTreeMap<String, Vec<Record>>> {
        let origin = path.display().to_string();
        let parsed: BTreeMap<String, Vec<Record>> = serde_json::from_slice(raw)
            .map_err(|e| ValidationError::schema(&origin, &e.to_string()))?;

        let mut entries: BTreeMap<String, Vec<Record>> = BTreeMap::new();
        for (key, records) in parsed {
            // Keys are whatever `add` stored, which includes acronyms such
            // as "r&d" that cannot be typed as a query
            if key.trim().is_empty() {
                log::warn!("Skipping empty key in cache {origin}");
                continue;
            }
            for record in &records {
                record
                    .validate()
                    .map_err(|e| ValidationError::schema(&origin, &e.to_string()))?;
            }
            let slot = entries.entry(fold_key(&key)).or_default();
            for record in records {
                if !slot.contains(&record) {
                    slot.push(record);
                }
            }
        }

        Ok(entries)
    }

    /// Records cached under `key`, compared case-insensitively
    pub fn get(&self, key: &str) -> &[Record] {
        self.entries
            .get(&fold_key(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&fold_key(key))
    }

    /// Cached keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records that are not already cached under their key
    ///
    /// Returns how many records were actually added.
    pub fn add<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = Record>,
    {
        let mut added = 0;
        for record in records {
            let slot = self.entries.entry(record.lookup_key()).or_default();
            if !slot.contains(&record) {
                slot.push(record);
                added += 1;
            }
        }
        added
    }

    /// Deterministic on-disk representation
    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.entries)?)
    }

    /// Whether the in-memory content differs from the last persisted state
    pub fn is_dirty(&self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        match self.serialize() {
            Ok(encoded) => self.digest.as_deref() != Some(hex_digest(&encoded).as_str()),
            Err(e) => {
                log::warn!("Failed to serialize cache {}: {e}", self.path.display());
                true
            }
        }
    }

    /// Write the cache file if its content changed
    ///
    /// Returns `Ok(true)` when the file was written. An empty store is never
    /// written.
    pub fn save(&mut self) -> Result<bool> {
        if self.entries.is_empty() {
            return Ok(false);
        }

        let encoded = self.serialize()?;
        let digest = hex_digest(&encoded);

        if self.digest.as_deref() == Some(digest.as_str()) {
            log::trace!("Cache {} unchanged, skipping write", self.path.display());
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IoError::from_std(e).with_path(parent))?;
        }

        std::fs::write(&self.path, &encoded)
            .map_err(|e| IoError::from_std(e).with_path(&self.path))?;

        log::debug!(
            "Wrote {} cached keys to {}",
            self.entries.len(),
            self.path.display()
        );
        self.digest = Some(digest);
        Ok(true)
    }
}
