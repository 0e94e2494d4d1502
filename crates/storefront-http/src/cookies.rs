//! Cookie jar shared by the transport and the refresh client.
//!
//! The refresh endpoint authenticates with a cookie the backend set at login,
//! so a process that wants to refresh a credential obtained by an earlier
//! process has to carry the jar across runs. [`CookieJar::load`] and
//! [`CookieJar::save`] do that with a JSON file next to the credential store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, MutexGuard};

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, instrument};

use storefront_core::Result;
use storefront_core::error::StorageError;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Name of the persisted jar inside a data directory.
pub const COOKIES_FILE: &str = "cookies.json";

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn corrupt(path: &Path, message: impl ToString) -> StorageError {
    StorageError::Corrupt {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// A cookie jar, either in memory only or backed by a file.
///
/// Cloning shares the same jar.
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: Arc<CookieStoreMutex>,
    path: Option<PathBuf>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CookieJar {
    /// A jar that lives as long as the process.
    pub fn in_memory() -> Self {
        Self {
            cookies: Arc::new(CookieStoreMutex::new(CookieStore::default())),
            path: None,
        }
    }

    /// Open the jar persisted at `path`. A missing file yields an empty jar.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file exists but cannot be read or
    /// parsed.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let cookies = if path.exists() {
            let file = File::open(&path).map_err(|e| io_error(&path, e))?;
            cookie_store::serde::json::load_all(BufReader::new(file))
                .map_err(|e| corrupt(&path, e))?
        } else {
            CookieStore::default()
        };

        debug!("Cookie jar loaded");
        Ok(Self {
            cookies: Arc::new(CookieStoreMutex::new(cookies)),
            path: Some(path),
        })
    }

    /// Where the jar is persisted, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True when the jar holds no cookies.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.iter_any().next().is_none())
    }

    /// Write the jar to its file. Session cookies are kept, since the
    /// refresh cookie usually carries no expiry. A no-op for in-memory jars.
    #[instrument(skip(self))]
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let tmp = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp).map_err(|e| io_error(&tmp, e))?;

            // Set restrictive permissions (Unix only)
            #[cfg(unix)]
            {
                let mut perms = file.metadata().map_err(|e| io_error(&tmp, e))?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&tmp, perms).map_err(|e| io_error(&tmp, e))?;
            }

            let mut writer = BufWriter::new(file);
            let cookies = self.lock()?;
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&cookies, &mut writer)
                .map_err(|e| corrupt(&tmp, e))?;
            writer.flush().map_err(|e| io_error(&tmp, e))?;
        }

        fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
        debug!(path = %path.display(), "Cookie jar saved");
        Ok(())
    }

    /// Drop every cookie and delete the persisted file.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();

        if let Some(path) = &self.path
            && path.exists()
        {
            fs::remove_file(path).map_err(|e| io_error(path, e))?;
            debug!(path = %path.display(), "Cookie jar removed");
        }
        Ok(())
    }

    /// The provider handed to `reqwest`.
    pub(crate) fn provider(&self) -> Arc<CookieStoreMutex> {
        self.cookies.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CookieStore>> {
        let cookies = self.cookies.lock().map_err(|_| {
            let path = self.path.as_deref().unwrap_or_else(|| Path::new(COOKIES_FILE));
            corrupt(path, "cookie jar lock poisoned")
        })?;
        Ok(cookies)
    }
}
