//! Directory tree of definitions files

use super::Provider;
use crate::definitions::parse_definitions;
use crate::descriptor::ProviderKind;
use crate::error::{ConfigError, IoError, Result};
use crate::record::Record;
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use walkdir::WalkDir;

/// Files picked up when no pattern is configured
pub const DEFAULT_PATTERN: &str = "*.json";

/// Merges every matching definitions file below a root directory
///
/// The tree is walked once per session. Files that fail to parse are skipped
/// with a warning; the rest still contribute.
#[derive(Debug)]
pub struct JsonPathProvider {
    root: PathBuf,
    patterns: GlobSet,
    table: OnceCell<Vec<Record>>,
}

impl JsonPathProvider {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_patterns(root, &[DEFAULT_PATTERN.to_string()])
    }

    /// Only read files whose name matches one of `patterns`
    pub fn with_patterns(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                ConfigError::invalid_descriptor(format!("invalid pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let patterns = builder
            .build()
            .map_err(|e| ConfigError::invalid_descriptor(e.to_string()))?;

        Ok(Self {
            root: root.into(),
            patterns,
            table: OnceCell::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let root = self.root.clone();
        let patterns = self.patterns.clone();
        tokio::task::spawn_blocking(move || load_tree(&root, &patterns))
            .await
            .map_err(|e| IoError::from_std(std::io::Error::other(e)).with_path(&self.root))?
    }

    async fn table(&self) -> Result<&Vec<Record>> {
        self.table.get_or_try_init(|| self.load()).await
    }
}

fn load_tree(root: &Path, patterns: &GlobSet) -> Result<Vec<Record>> {
    if !root.is_dir() {
        return Err(IoError::file_not_found(root).into());
    }

    let mut records = Vec::new();
    let mut files = 0usize;
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Walk error under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() || !patterns.is_match(entry.file_name()) {
            continue;
        }

        let path = entry.path();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Skipping unreadable {}: {e}", path.display());
                continue;
            }
        };
        match parse_definitions(&raw, &path.display().to_string()) {
            Ok(parsed) => {
                files += 1;
                records.extend(parsed);
            }
            Err(e) => log::warn!("Skipping {}: {e}", path.display()),
        }
    }

    log::debug!(
        "Loaded {} definitions from {files} files under {}",
        records.len(),
        root.display()
    );
    Ok(records)
}

#[async_trait]
impl Provider for JsonPathProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::JsonPath
    }

    fn validate(&self) -> bool {
        self.root.is_dir()
    }

    async fn fetch_from_source(&self, _key: &str) -> Result<Vec<Record>> {
        Ok(self.table().await?.clone())
    }

    fn cache_key(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch_all(&self) -> Result<Option<Vec<Record>>> {
        Ok(Some(self.table().await?.clone()))
    }
}
