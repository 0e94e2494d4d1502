//! Observable session state.
//!
//! [`SessionState`] mirrors whether the credential store holds a credential.
//! UI layers subscribe to it to choose between authenticated and anonymous
//! rendering. It never holds the credential itself.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::Result;
use crate::store::CredentialStore;

/// Whether the user is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

/// Process-wide session state, owned by whoever builds the client.
///
/// Cheap to clone; clones share the same state. Transitions:
///
/// - `Anonymous -> Authenticated` on [`authenticate`](Self::authenticate)
/// - `Authenticated -> Authenticated` on [`authenticate`](Self::authenticate)
///   (credential rotation, observers are notified again)
/// - `Authenticated -> Anonymous` on [`clear`](Self::clear)
///
/// Clearing an anonymous session does nothing and notifies no one.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<SessionStatus>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh, anonymous session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionStatus::Anonymous);
        Self { tx: Arc::new(tx) }
    }

    /// A session seeded from whatever the store holds at startup.
    pub async fn restore(store: &dyn CredentialStore) -> Result<Self> {
        let session = Self::new();
        if store.get().await?.is_some() {
            debug!("Restored authenticated session from store");
            session.authenticate();
        }
        Ok(session)
    }

    pub fn status(&self) -> SessionStatus {
        *self.tx.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.tx.subscribe()
    }

    /// Mark the session authenticated after a login or credential rotation.
    pub fn authenticate(&self) {
        self.tx.send_replace(SessionStatus::Authenticated);
    }

    /// Mark the session anonymous.
    pub fn clear(&self) {
        self.tx.send_if_modified(|status| {
            if *status == SessionStatus::Anonymous {
                false
            } else {
                *status = SessionStatus::Anonymous;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Credential;
    use crate::store::MemoryCredentialStore;

    #[test]
    fn starts_anonymous() {
        assert_eq!(SessionState::new().status(), SessionStatus::Anonymous);
    }

    #[test]
    fn clear_twice_stays_anonymous() {
        let session = SessionState::new();
        session.authenticate();
        session.clear();
        session.clear();
        assert_eq!(session.status(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn observers_see_rotation_but_not_redundant_clear() {
        let session = SessionState::new();
        let mut rx = session.subscribe();

        session.authenticate();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionStatus::Authenticated);

        session.authenticate();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        session.clear();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionStatus::Anonymous);

        session.clear();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn restore_mirrors_store() {
        let empty = MemoryCredentialStore::new();
        assert!(!SessionState::restore(&empty).await.unwrap().is_authenticated());

        let full = MemoryCredentialStore::with_credential(Credential::new("A1"));
        assert!(SessionState::restore(&full).await.unwrap().is_authenticated());
    }

    #[test]
    fn clones_share_state() {
        let session = SessionState::new();
        let view = session.clone();
        session.authenticate();
        assert!(view.is_authenticated());
    }
}
