//! Single local definitions file

use super::Provider;
use crate::definitions::parse_definitions;
use crate::descriptor::ProviderKind;
use crate::error::{IoError, Result};
use crate::record::Record;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// Reads one `{meta, defs}` file, parsed once per session
#[derive(Debug)]
pub struct JsonFileProvider {
    path: PathBuf,
    table: OnceCell<Vec<Record>>,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| IoError::from_std(e).with_path(&self.path))?;
        let records = parse_definitions(&raw, &self.path.display().to_string())?;
        log::debug!(
            "Loaded {} definitions from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    async fn table(&self) -> Result<&Vec<Record>> {
        self.table.get_or_try_init(|| self.load()).await
    }
}

#[async_trait]
impl Provider for JsonFileProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::JsonFile
    }

    fn validate(&self) -> bool {
        self.path.is_file() && self.path.extension().is_some_and(|ext| ext == "json")
    }

    async fn fetch_from_source(&self, _key: &str) -> Result<Vec<Record>> {
        Ok(self.table().await?.clone())
    }

    fn cache_key(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_all(&self) -> Result<Option<Vec<Record>>> {
        Ok(Some(self.table().await?.clone()))
    }
}
