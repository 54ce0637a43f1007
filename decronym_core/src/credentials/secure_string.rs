//! Secret string that zeroes its memory on drop

use std::fmt;
use zeroize::Zeroize;

/// A string that zeros its memory when dropped
///
/// Holds passwords and API tokens. It never prints its content through
/// `Debug` or `Display` and compares in constant time.
#[derive(Clone, Zeroize)]
pub struct SecureString {
    inner: Vec<u8>,
}

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: s.into().into_bytes(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Borrow the secret as text, if it is valid UTF-8
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.inner)
    }

    /// Copy the secret into a plain `String`
    ///
    /// The copy is NOT zeroed on drop. Only hand it straight to the HTTP
    /// client.
    pub fn expose_secret(&self) -> String {
        String::from_utf8_lossy(&self.inner).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Constant-time comparison
    pub fn constant_time_eq(&self, other: &Self) -> bool {
        if self.inner.len() != other.inner.len() {
            return false;
        }

        let mut result = 0u8;
        for (a, b) in self.inner.iter().zip(other.inner.iter()) {
            result |= a ^ b;
        }
        result == 0
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.constant_time_eq(other)
    }
}

impl Eq for SecureString {}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
