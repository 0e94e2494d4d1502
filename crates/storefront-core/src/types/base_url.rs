//! Backend base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::{Host, Url};

use crate::error::{Error, InvalidInputError};

/// A validated backend base URL.
///
/// Every API path is resolved against this URL. The base may carry a path
/// prefix (for example `https://shop.example/api/v1`); paths are appended to
/// it rather than replacing it.
///
/// Must be an `http` or `https` URL with a host. Plain HTTP is accepted for
/// any host so LAN and container backends (`http://backend:5000`) work; see
/// [`is_secure`](Self::is_secure) and [`is_loopback`](Self::is_loopback).
///
/// # Example
///
/// ```
/// use storefront_core::BaseUrl;
///
/// let base = BaseUrl::new("https://shop.example/api/").unwrap();
/// assert_eq!(base.endpoint("/orders"), "https://shop.example/api/orders");
/// assert_eq!(base.endpoint("user/wishlist/add"), "https://shop.example/api/user/wishlist/add");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::BaseUrl {
                value: s.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(Self(url))
    }

    /// Returns the absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// True for `https` URLs.
    pub fn is_secure(&self) -> bool {
        self.0.scheme() == "https"
    }

    /// True when the host is this machine.
    pub fn is_loopback(&self) -> bool {
        match self.0.host() {
            Some(Host::Domain(domain)) => domain == "localhost",
            Some(Host::Ipv4(addr)) => addr.is_loopback(),
            Some(Host::Ipv6(addr)) => addr.is_loopback(),
            None => false,
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        if !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must use http or https".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
