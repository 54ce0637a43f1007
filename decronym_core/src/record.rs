//! Normalized acronym definition
//!
//! A [`Record`] is immutable once built. Equality and hashing only consider
//! the acronym, full form and comment, so the same definition reported by two
//! sources (with different provenance labels or tags) is treated as a
//! duplicate when merged into a cache.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// One definition of an acronym
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    acronym: String,
    full: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    tags: BTreeSet<String>,
}

impl Record {
    /// Create a record, rejecting an empty full form
    pub fn new(
        acronym: impl Into<String>,
        full: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let acronym = acronym.into();
        let full = full.into();

        if full.trim().is_empty() {
            return Err(ValidationError::EmptyFullForm { acronym });
        }

        Ok(Self {
            acronym,
            full,
            comment: String::new(),
            source: String::new(),
            tags: BTreeSet::new(),
        })
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn acronym(&self) -> &str {
        &self.acronym
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Case-folded acronym used as cache and lookup key
    pub fn lookup_key(&self) -> String {
        fold_key(&self.acronym)
    }

    /// True if the record carries at least one of `tags`
    pub fn has_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.tags.contains(t.as_ref()))
    }

    /// Re-check the full form after deserialization
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.full.trim().is_empty() {
            return Err(ValidationError::EmptyFullForm {
                acronym: self.acronym.clone(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.acronym == other.acronym && self.full == other.full && self.comment == other.comment
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.acronym.hash(state);
        self.full.hash(state);
        self.comment.hash(state);
    }
}

/// Case-fold a lookup key
pub fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

/// Accepted acronym spelling: non-empty, ASCII letters, digits and `-`
pub fn is_valid_acronym(acronym: &str) -> bool {
    !acronym.is_empty()
        && acronym
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
