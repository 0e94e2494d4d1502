//! Request and response values exchanged with the transport.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::{ApiError, Error, InvalidInputError, TransportError};

/// Header name used for bearer credentials.
pub const AUTHORIZATION: &str = "authorization";

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", other),
            }
            .into()),
        }
    }
}

/// One logical API request.
///
/// Requests are immutable values. The client never mutates a caller's request;
/// attaching a credential produces a new value via [`ApiRequest::authorized`].
///
/// # Example
///
/// ```
/// use storefront_core::{ApiRequest, Method};
///
/// let request = ApiRequest::get("/orders").query("page", "2");
/// assert_eq!(request.method(), Method::Get);
/// assert_eq!(request.path(), "/orders");
/// ```
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with no query, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a header. Names are case-insensitive and stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error for names or values that cannot go on the wire.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        validate_header(name, &value)?;
        self.headers.insert(name.to_ascii_lowercase(), value);
        Ok(self)
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(InvalidInputError::from)?;
        self.body = Some(value);
        Ok(self)
    }

    /// Returns a copy carrying `Authorization: Bearer <credential>`.
    ///
    /// Any bearer already present is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is not a valid header value.
    pub fn authorized(&self, credential: &Credential) -> Result<Self, Error> {
        self.clone().header(AUTHORIZATION, credential.bearer())
    }

    /// Returns a copy without an `Authorization` header.
    pub fn anonymous(&self) -> Self {
        let mut request = self.clone();
        request.headers.remove(AUTHORIZATION);
        request
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

// Custom Debug impl that hides the bearer header
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k == AUTHORIZATION {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &headers)
            .field("body", &self.body.is_some())
            .finish()
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), Error> {
    let name_ok = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !name_ok {
        return Err(InvalidInputError::Header {
            name: name.to_string(),
            reason: "not a valid header name".to_string(),
        }
        .into());
    }
    if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
        return Err(InvalidInputError::Header {
            name: name.to_string(),
            reason: "value contains control characters".to_string(),
        }
        .into());
    }
    Ok(())
}

/// A response from the backend, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

/// The backend's JSON envelope: `{ success, message, data }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Build a JSON response. Mostly useful for fakes.
    pub fn with_json(status: u16, body: &serde_json::Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::new(status, headers, body.to_string().into_bytes())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The backend signals an expired or missing credential with 401.
    pub fn is_auth_expired(&self) -> bool {
        self.status == 401
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the whole body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| {
            TransportError::Body {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Decode the `data` field of the backend envelope.
    ///
    /// Returns `Ok(None)` when the envelope has no `data`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<Option<T>, Error> {
        let envelope: Envelope<T> = self.json()?;
        Ok(envelope.data)
    }

    /// Convert a non-success status into [`Error::Api`].
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Api(self.to_api_error()))
        }
    }

    /// Describe this response as an [`ApiError`], reading the envelope message.
    pub fn to_api_error(&self) -> ApiError {
        let message = serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message);
        ApiError::new(self.status, message)
    }
}
