//! Validation related error types

use thiserror::Error;

/// Records, acronyms and payloads that fail their expected shape
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A definition without a full form
    #[error("Definition for '{acronym}' has an empty full form")]
    EmptyFullForm { acronym: String },

    /// Acronym contains characters outside `[A-Za-z0-9-]`
    #[error("Invalid acronym '{acronym}': only letters, digits and '-' are accepted")]
    InvalidAcronym { acronym: String },

    /// Payload (definition file, feed, cache file) does not match its schema
    #[error("Invalid payload from {origin}: {reason}")]
    Schema { origin: String, reason: String },
}

impl ValidationError {
    /// Create an invalid acronym error
    pub fn invalid_acronym(acronym: &str) -> Self {
        Self::InvalidAcronym {
            acronym: acronym.to_string(),
        }
    }

    /// Create a schema error for the named origin
    pub fn schema(origin: &str, reason: &str) -> Self {
        Self::Schema {
            origin: origin.to_string(),
            reason: reason.to_string(),
        }
    }
}
