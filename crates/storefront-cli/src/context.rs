//! Shared command context: configuration, credential store and client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use tracing::debug;

use storefront_core::{ApiClient, AuthApi, BaseUrl, ClientConfig, CredentialStore};
use storefront_file::FileCredentialStore;
use storefront_http::{COOKIES_FILE, CookieJar};

use crate::cli::Cli;
use crate::output;

/// Everything a command needs to reach the backend.
///
/// The credential and the backend's cookies live side by side in the data
/// directory; the refresh endpoint needs both.
pub struct Context {
    config: ClientConfig,
    store: Arc<FileCredentialStore>,
    cookies: CookieJar,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = ClientConfig::default();

        if let Some(url) = &cli.backend_url {
            config.base_url = Some(BaseUrl::new(url).context("Invalid backend URL")?);
        }
        if let Some(secs) = cli.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(mode) = cli.refresh_mode {
            config.refresh_mode = mode;
        }

        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        let cookies =
            CookieJar::load(data_dir.join(COOKIES_FILE)).context("Failed to load cookies")?;
        let store = Arc::new(FileCredentialStore::new(data_dir, config.credential_key.clone()));

        Ok(Self {
            config,
            store,
            cookies,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &FileCredentialStore {
        &self.store
    }

    /// Build a client that tells the user to sign in again on teardown.
    pub async fn client(&self) -> Result<ApiClient> {
        self.config
            .require_base_url()
            .context("No backend configured. Pass --backend-url or set STOREFRONT_BACKEND_URL.")?;

        let navigator = |_path: &str| {
            output::error("Session expired. Run 'storefront login' to sign in again.");
        };

        storefront_http::connect_with_jar(
            &self.config,
            self.store.clone(),
            Arc::new(navigator),
            &self.cookies,
        )
        .await
        .context("Failed to create API client")
    }

    pub async fn auth(&self) -> Result<AuthApi> {
        Ok(AuthApi::new(self.client().await?))
    }

    /// Persist cookies for the next run while a credential is stored, and
    /// forget them once it is gone (logout or a torn-down session).
    pub async fn finish(&self) -> Result<()> {
        let signed_in = self
            .store
            .get()
            .await
            .context("Failed to read credentials")?
            .is_some();

        if signed_in {
            self.cookies.save().context("Failed to save cookies")?;
        } else {
            self.cookies.clear().context("Failed to remove cookies")?;
            debug!("No credential stored, cookies cleared");
        }
        Ok(())
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "storefront").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
