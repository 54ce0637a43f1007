//! Error types for the decronym lookup core
//!
//! This module contains all error types used throughout the library, organized
//! into categories that mirror how the lookup core reacts to them.

use thiserror::Error;

pub mod config;
pub mod io;
pub mod transport;
pub mod validation;

pub use self::config::ConfigError;
pub use self::io::{IoError, IoErrorKind};
pub use self::transport::TransportError;
pub use self::validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the lookup core
///
/// Errors are categorized into four main types:
/// - Configuration errors: bad or duplicate provider descriptors
/// - Validation errors: records, acronyms and payloads that fail their schema
/// - Transport errors: unreachable hosts, timeouts and non-2xx responses
/// - I/O errors: file system access
///
/// None of these abort a lookup batch. The aggregator isolates them per
/// provider and per acronym.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network transport errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

impl Error {
    /// Whether this error should mark the provider invalid for the session
    pub fn invalidates_provider(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Validation(ValidationError::Schema { .. }) => true,
            Self::Io(_) => true,
            Self::Config(_) => true,
            Self::Validation(_) => false,
        }
    }
}

// Conversions from external error types

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(ValidationError::schema("json", &err.to_string()))
    }
}
