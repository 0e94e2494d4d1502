//! Mapping of reqwest failures onto the core error taxonomy.

use storefront_core::error::TransportError;

pub(crate) fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        TransportError::Body {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}
