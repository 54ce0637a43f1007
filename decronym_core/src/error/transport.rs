//! Network transport error types

use thiserror::Error;

/// Failures reaching a remote definition source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Host unreachable, DNS failure, TLS failure
    #[error("Failed to reach {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Request exceeded its timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {code}")]
    Status { url: String, code: u16 },

    /// Response body could not be read
    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

impl TransportError {
    /// Create a connection error
    pub fn connect(url: &str, reason: &str) -> Self {
        Self::Connect {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a timeout error
    pub fn timeout(url: &str) -> Self {
        Self::Timeout {
            url: url.to_string(),
        }
    }

    /// Create a status error
    pub fn status(url: &str, code: u16) -> Self {
        Self::Status {
            url: url.to_string(),
            code,
        }
    }

    /// Create a body read error
    pub fn body(url: &str, reason: &str) -> Self {
        Self::Body {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The status code, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
