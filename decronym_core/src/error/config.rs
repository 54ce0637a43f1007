//! Configuration related error types

use thiserror::Error;

/// Provider descriptor errors
///
/// These are never fatal on their own: the offending descriptor is logged and
/// left out of the active provider set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Same `(type, location)` pair added twice
    #[error("Source '{kind}' at '{location}' is already configured")]
    DuplicateProvider { kind: String, location: String },

    /// `type` string that maps to no provider variant
    #[error("Unknown source type '{kind}'")]
    UnknownProviderType { kind: String },

    /// Variant-specific parameter missing from `extra`
    #[error("Source '{kind}' requires extra parameter '{parameter}'")]
    MissingExtra { kind: String, parameter: String },

    /// Descriptor that is structurally wrong
    #[error("Invalid source descriptor: {message}")]
    InvalidDescriptor { message: String },
}

impl ConfigError {
    /// Create a duplicate provider error
    pub fn duplicate(kind: &str, location: &str) -> Self {
        Self::DuplicateProvider {
            kind: kind.to_string(),
            location: location.to_string(),
        }
    }

    /// Create an unknown provider type error
    pub fn unknown_type(kind: &str) -> Self {
        Self::UnknownProviderType {
            kind: kind.to_string(),
        }
    }

    /// Create a missing extra parameter error
    pub fn missing_extra(kind: &str, parameter: &str) -> Self {
        Self::MissingExtra {
            kind: kind.to_string(),
            parameter: parameter.to_string(),
        }
    }

    /// Create an invalid descriptor error
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }
}
