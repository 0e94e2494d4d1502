//! Credential persistence in a JSON key/value file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use storefront_core::error::StorageError;
use storefront_core::{Credential, CredentialStore, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Name of the key/value file inside the store directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

const LOCK_FILE: &str = "credentials.lock";

/// One persisted entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    value: String,
    saved_at: DateTime<Utc>,
}

type Entries = BTreeMap<String, StoredCredential>;

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// A credential store that survives restarts.
///
/// Entries live in `<dir>/credentials.json`, keyed by name; this store owns
/// exactly one key. Writes go to a temporary file that is renamed over the
/// original while an advisory lock is held, so readers in other processes
/// never see a half-written file. On Unix the file is readable by the owner
/// only.
#[derive(Debug)]
pub struct FileCredentialStore {
    dir: PathBuf,
    key: String,
    guard: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store for `key` inside `dir`. Nothing is touched on disk
    /// until the first write.
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.into(),
            guard: Mutex::new(()),
        }
    }

    /// Path of the key/value file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// When the current credential was written, if there is one.
    pub async fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let _guard = self.guard.lock().await;
        let _lock = self.lock(false)?;
        Ok(self.read_entries()?.get(&self.key).map(|e| e.saved_at))
    }

    /// Take the cross-process advisory lock.
    fn lock(&self, exclusive: bool) -> Result<File> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| io_error(&path, e))?;
        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(|e| io_error(&path, e))?;
        Ok(file)
    }

    fn read_entries(&self) -> Result<Entries> {
        let path = self.path();
        if !path.exists() {
            return Ok(Entries::new());
        }

        let json = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        if json.trim().is_empty() {
            return Ok(Entries::new());
        }

        let entries = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let path = self.path();
        let tmp = self.dir.join(format!("{}.tmp", CREDENTIALS_FILE));

        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        {
            let mut file = File::create(&tmp).map_err(|e| io_error(&tmp, e))?;

            // Set restrictive permissions (Unix only)
            #[cfg(unix)]
            {
                let mut perms = file.metadata().map_err(|e| io_error(&tmp, e))?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&tmp, perms).map_err(|e| io_error(&tmp, e))?;
            }

            file.write_all(json.as_bytes())
                .map_err(|e| io_error(&tmp, e))?;
            file.sync_all().map_err(|e| io_error(&tmp, e))?;
        }

        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn get(&self) -> Result<Option<Credential>> {
        let _guard = self.guard.lock().await;
        let _lock = self.lock(false)?;
        let entries = self.read_entries()?;
        Ok(entries.get(&self.key).map(|e| Credential::new(e.value.clone())))
    }

    #[instrument(skip(self, credential), fields(key = %self.key))]
    async fn set(&self, credential: Credential) -> Result<()> {
        let _guard = self.guard.lock().await;
        let _lock = self.lock(true)?;

        let mut entries = self.read_entries()?;
        entries.insert(
            self.key.clone(),
            StoredCredential {
                value: credential.as_str().to_string(),
                saved_at: Utc::now(),
            },
        );
        self.write_entries(&entries)?;

        debug!(path = %self.path().display(), "Credential saved");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn clear(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        let _lock = self.lock(true)?;

        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_none() {
            return Ok(());
        }

        if entries.is_empty() {
            let path = self.path();
            fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
        } else {
            self.write_entries(&entries)?;
        }

        debug!("Credential removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = TempDir::new().unwrap();

        let store = FileCredentialStore::new(dir.path(), "token");
        assert_eq!(store.get().await.unwrap(), None);
        store.set(Credential::new("A1")).await.unwrap();

        let reopened = FileCredentialStore::new(dir.path(), "token");
        assert_eq!(reopened.get().await.unwrap(), Some(Credential::new("A1")));
        assert!(reopened.saved_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn set_replaces_previous_value() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path(), "token");

        store.set(Credential::new("A1")).await.unwrap();
        store.set(Credential::new("A2")).await.unwrap();

        assert_eq!(store.get().await.unwrap(), Some(Credential::new("A2")));
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("A1"));
    }

    #[tokio::test]
    async fn clear_is_idempotent_and_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path(), "token");

        store.clear().await.unwrap();
        store.set(Credential::new("A1")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.get().await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let shop = FileCredentialStore::new(dir.path(), "token");
        let admin = FileCredentialStore::new(dir.path(), "admin-token");

        shop.set(Credential::new("S1")).await.unwrap();
        admin.set(Credential::new("X1")).await.unwrap();
        shop.clear().await.unwrap();

        assert_eq!(shop.get().await.unwrap(), None);
        assert_eq!(admin.get().await.unwrap(), Some(Credential::new("X1")));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path(), "token");
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.get().await.unwrap_err();
        assert!(matches!(
            err,
            storefront_core::Error::Storage(StorageError::Corrupt { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path(), "token");
        store.set(Credential::new("A1")).await.unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
