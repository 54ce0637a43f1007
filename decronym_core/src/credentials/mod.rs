//! Credentials for authenticated definition sources
//!
//! The core never stores or prompts for credentials itself. A provider that
//! needs them asks its [`CredentialSource`] once per session and hands the
//! result straight to the transport.

pub mod secure_string;

pub use secure_string::SecureString;

use async_trait::async_trait;
use std::fmt;

/// Username and secret for HTTP basic authentication
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecureString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecureString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

/// Supplies credentials for a remote location
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Credentials for `location`, or `None` to proceed unauthenticated
    async fn credentials(&self, location: &str) -> Option<Credentials>;
}

/// Never supplies credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

#[async_trait]
impl CredentialSource for NoCredentials {
    async fn credentials(&self, _location: &str) -> Option<Credentials> {
        None
    }
}

/// Supplies the same credentials for every location
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn credentials(&self, _location: &str) -> Option<Credentials> {
        Some(self.0.clone())
    }
}
