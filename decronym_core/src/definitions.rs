//! Definition source file format
//!
//! Local files, directory trees and remote JSON feeds all share one layout:
//!
//! ```json
//! { "meta": {"source": "...", "tags": ["..."]},
//!   "defs": [ {"acro": "DMA", "full": "Direct Memory Access", "comment": "", "tags": []} ] }
//! ```
//!
//! `meta` is optional. `meta.tags` are added to every entry and `meta.source`
//! replaces the default provenance label.

use crate::error::{Error, Result, ValidationError};
use crate::record::Record;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    meta: Meta,
    defs: Vec<RawDefinition>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    source: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    acro: String,
    full: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse a definitions payload into records
///
/// `origin` names the payload in errors and is the source label when the file
/// does not carry `meta.source`.
pub fn parse_definitions(raw: &str, origin: &str) -> Result<Vec<Record>> {
    let file: DefinitionFile = serde_json::from_str(raw)
        .map_err(|e| Error::Validation(ValidationError::schema(origin, &e.to_string())))?;

    let source = file.meta.source.as_deref().unwrap_or(origin);

    file.defs
        .into_iter()
        .map(|def| -> Result<Record> {
            let record = Record::new(def.acro, def.full)
                .map_err(|e| ValidationError::schema(origin, &e.to_string()))?
                .with_comment(def.comment)
                .with_source(source)
                .with_tags(def.tags)
                .with_tags(file.meta.tags.iter().cloned());
            Ok(record)
        })
        .collect()
}

/// Group records by their case-folded acronym, keeping file order
pub fn index_by_key(records: Vec<Record>) -> BTreeMap<String, Vec<Record>> {
    let mut index: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        let entry = index.entry(record.lookup_key()).or_default();
        if !entry.contains(&record) {
            entry.push(record);
        }
    }
    index
}
