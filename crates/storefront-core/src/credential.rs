//! Bearer credential type.

use std::fmt;

/// The bearer token used to authorize API calls.
///
/// Credentials are short-lived and opaque. The client learns that one has
/// expired only when the backend rejects a request with it.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Create a new credential.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value.
    ///
    /// # Security
    ///
    /// Use only when constructing authorization headers or persisting.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this credential.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_hides_value_in_debug() {
        let token = Credential::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(Credential::new("A1").bearer(), "Bearer A1");
    }
}
