//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};
use crate::types::BaseUrl;

/// Environment variable holding the backend base URL.
pub const ENV_BACKEND_URL: &str = "STOREFRONT_BACKEND_URL";

/// Environment variable holding the per-call timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "STOREFRONT_TIMEOUT_SECS";

/// Environment variable selecting the [`RefreshMode`].
pub const ENV_REFRESH_MODE: &str = "STOREFRONT_REFRESH_MODE";

/// Default per-call timeout (two minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default refresh endpoint path.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/regenerate-token";

/// Default login screen path used for the navigation signal.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default key the credential is persisted under.
pub const DEFAULT_CREDENTIAL_KEY: &str = "token";

/// How concurrent expirations are refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshMode {
    /// Every expired request runs its own refresh call.
    #[default]
    PerRequest,
    /// Concurrent expired requests share one refresh call.
    SingleFlight,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::PerRequest => f.write_str("per-request"),
            RefreshMode::SingleFlight => f.write_str("single-flight"),
        }
    }
}

impl FromStr for RefreshMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-request" => Ok(RefreshMode::PerRequest),
            "single-flight" => Ok(RefreshMode::SingleFlight),
            other => Err(InvalidInputError::Other {
                message: format!("unknown refresh mode '{}'", other),
            }
            .into()),
        }
    }
}

/// Settings shared by the transport, the refresh client and [`ApiClient`]
/// (crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Option<BaseUrl>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub refresh_path: String,
    pub login_path: String,
    pub credential_key: String,
    pub refresh_mode: RefreshMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            refresh_mode: RefreshMode::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given backend with default settings.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url: Some(base_url),
            ..Self::default()
        }
    }

    /// Read configuration from `STOREFRONT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BACKEND_URL) {
            config.base_url = Some(BaseUrl::new(url)?);
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| InvalidInputError::Other {
                message: format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(mode) = lookup(ENV_REFRESH_MODE) {
            config.refresh_mode = mode.trim().parse()?;
        }

        Ok(config)
    }

    pub fn with_refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL or an error naming the variable to set.
    pub fn require_base_url(&self) -> Result<&BaseUrl, Error> {
        self.base_url.as_ref().ok_or_else(|| {
            InvalidInputError::Other {
                message: format!("backend URL not configured (set {})", ENV_BACKEND_URL),
            }
            .into()
        })
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
