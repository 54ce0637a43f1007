//! Builders for definition files and records

use decronym_core::Record;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Builder for `{meta, defs}` definition payloads
///
/// # Examples
///
/// ```rust,no_run
/// use decronym_test_utils::DefinitionFileBuilder;
///
/// let json = DefinitionFileBuilder::new()
///     .with_source("team glossary")
///     .define("DMA", "Direct Memory Access")
///     .to_json();
/// assert!(json.contains("DMA"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefinitionFileBuilder {
    source: Option<String>,
    meta_tags: Vec<String>,
    defs: Vec<Value>,
}

impl DefinitionFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `meta.source`
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Add a tag to `meta.tags`
    pub fn with_meta_tag(mut self, tag: &str) -> Self {
        self.meta_tags.push(tag.to_string());
        self
    }

    /// Add a bare definition
    pub fn define(self, acro: &str, full: &str) -> Self {
        self.define_with(acro, full, "", &[])
    }

    /// Add a definition with comment and tags
    pub fn define_with(mut self, acro: &str, full: &str, comment: &str, tags: &[&str]) -> Self {
        self.defs.push(json!({
            "acro": acro,
            "full": full,
            "comment": comment,
            "tags": tags,
        }));
        self
    }

    /// Serialize the payload
    pub fn to_json(&self) -> String {
        let mut meta = serde_json::Map::new();
        if let Some(source) = &self.source {
            meta.insert("source".to_string(), json!(source));
        }
        if !self.meta_tags.is_empty() {
            meta.insert("tags".to_string(), json!(self.meta_tags));
        }

        json!({ "meta": meta, "defs": self.defs }).to_string()
    }

    /// Write the payload to `dir/name` and return its path
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, self.to_json()).unwrap();
        path
    }
}

/// Record with no comment or tags
pub fn record(acronym: &str, full: &str) -> Record {
    Record::new(acronym, full).unwrap()
}

/// Record carrying `tags`
pub fn tagged_record(acronym: &str, full: &str, tags: &[&str]) -> Record {
    record(acronym, full).with_tags(tags.iter().copied())
}
