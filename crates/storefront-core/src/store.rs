//! Credential storage.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::credential::Credential;

/// The single source of truth for the current credential.
///
/// Implementations must be safe under concurrent readers and writers.
/// `set` replaces the stored value atomically (last write wins) and `clear`
/// is idempotent.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the current credential, if any.
    async fn get(&self) -> Result<Option<Credential>>;

    /// Replace the current credential.
    async fn set(&self, credential: Credential) -> Result<()>;

    /// Remove the current credential. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<()>;
}

/// A process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        Ok(self.slot.read().await.clone())
    }

    async fn set(&self, credential: Credential) -> Result<()> {
        *self.slot.write().await = Some(credential);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.slot.write().await.take();
        Ok(())
    }
}
