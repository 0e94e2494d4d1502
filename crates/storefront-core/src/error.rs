//! Error types for the storefront client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, backend, storage and input validation errors.
//!
//! Only transport failures and terminal authentication failures are errors of
//! [`ApiClient::send`](crate::ApiClient::send). Any other HTTP status is handed
//! back to the caller as a response; [`ApiResponse::error_for_status`]
//! (crate::ApiResponse::error_for_status) turns it into [`Error::Api`].

use std::fmt;
use thiserror::Error;

/// The unified error type for storefront client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Terminal authentication failures. The session has been torn down.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success response from the backend.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Successful response that does not match the backend contract.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Credential persistence errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (invalid URL, header value, body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this error ended the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Response body could not be read or decoded.
    #[error("invalid response body: {message}")]
    Body { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Terminal authentication failures.
///
/// Both variants are raised only after the credential store and session have
/// been cleared and the login navigation has been signalled.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The refresh endpoint could not produce a new credential.
    #[error("credential refresh failed: {0}")]
    RefreshFailed(RefreshFailure),

    /// The request was rejected again after a successful refresh.
    #[error("credential rejected after refresh: {0}")]
    Rejected(ApiError),
}

/// Why a refresh attempt did not yield a credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshFailure {
    /// The refresh call never produced a response.
    #[error("{0}")]
    Transport(TransportError),

    /// The refresh endpoint answered with a non-success status.
    #[error("refresh endpoint returned {0}")]
    Status(ApiError),

    /// The response did not carry a usable credential.
    #[error("refresh response missing credential")]
    MissingCredential,
}

/// A non-success response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the backend's error envelope, if present.
    pub message: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if this is an expired or missing credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// A success response the client cannot use.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Login succeeded but the body carried no credential.
    #[error("login response did not include a credential")]
    MissingCredential,
}

/// Credential persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Persisted data could not be parsed.
    #[error("corrupt credential file {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid backend base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Header name or value that cannot go on the wire.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Request body could not be serialized.
    #[error("invalid body: {message}")]
    Body { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

impl From<serde_json::Error> for InvalidInputError {
    fn from(err: serde_json::Error) -> Self {
        InvalidInputError::Body {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_message() {
        let err = ApiError::new(403, Some("Forbidden".into()));
        assert_eq!(err.to_string(), "HTTP 403: Forbidden");
        assert_eq!(ApiError::new(500, None).to_string(), "HTTP 500");
    }

    #[test]
    fn only_auth_errors_are_terminal() {
        let terminal = Error::from(AuthError::RefreshFailed(RefreshFailure::MissingCredential));
        assert!(terminal.is_terminal());

        let transport = Error::from(TransportError::Timeout {
            message: "120s".into(),
        });
        assert!(!transport.is_terminal());
    }
}
