//! Acronym tables stored on wiki pages
//!
//! The page body comes wrapped in the content API's JSON envelope. Only rows
//! with exactly three cells are read, as `acronym | full form | comment`.

use super::{pattern, strip_tags};
use crate::error::ValidationError;
use crate::record::{Record, is_valid_acronym};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

pub const TABLE_TAG: &str = "confluence";

static ROW_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>"));
static CELL_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<td\b[^>]*>(.*?)</td\s*>"));

#[derive(Debug, Deserialize)]
struct Content {
    title: String,
    body: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    storage: Storage,
}

#[derive(Debug, Deserialize)]
struct Storage {
    value: String,
}

/// Parse a content API response into records
///
/// Every record's source reads `"{page title} at {url}"`. Rows whose first
/// cell is not a valid acronym (header rows, notes) are skipped.
pub fn extract_table(payload: &str, url: &str) -> Result<Vec<Record>, ValidationError> {
    let content: Content =
        serde_json::from_str(payload).map_err(|e| ValidationError::schema(url, &e.to_string()))?;
    let source = format!("{} at {url}", content.title);

    let mut records: Vec<Record> = Vec::new();
    for row in ROW_RE.captures_iter(&content.body.storage.value) {
        let cells: Vec<String> = CELL_RE
            .captures_iter(&row[1])
            .map(|cell| strip_tags(&cell[1]))
            .collect();
        let [acronym, full, comment] = cells.as_slice() else {
            continue;
        };

        if !is_valid_acronym(acronym) {
            log::trace!("Skipping table row '{acronym}'");
            continue;
        }

        let Ok(record) = Record::new(acronym.as_str(), full.as_str()) else {
            continue;
        };
        let record = record
            .with_comment(comment.as_str())
            .with_source(source.as_str())
            .with_tags([TABLE_TAG]);
        if !records.contains(&record) {
            records.push(record);
        }
    }

    Ok(records)
}
