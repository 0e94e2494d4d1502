//! The authenticated request client.
//!
//! [`ApiClient`] wraps every outbound request. It attaches the current
//! credential, and when the backend answers 401 it refreshes the credential
//! once and replays the request once. If the refresh fails, or the replayed
//! request is rejected again, the session is torn down: the credential store
//! and [`SessionState`] are cleared, the [`Navigator`] is told to show the
//! login screen, and the triggering error is returned to the caller.
//!
//! Per logical request there are at most two transport calls and at most one
//! refresh call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::Result;
use crate::config::{ClientConfig, DEFAULT_LOGIN_PATH, RefreshMode};
use crate::credential::Credential;
use crate::error::{AuthError, Error, RefreshFailure};
use crate::request::{ApiRequest, ApiResponse};
use crate::session::SessionState;
use crate::store::{CredentialStore, MemoryCredentialStore};
use crate::traits::{Navigator, NoopNavigator, RefreshOutcome, Refresher, Transport};

/// Which send of a logical request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retry,
}

/// The authenticated request client.
///
/// Cheap to clone (internal `Arc`) and safe to share across tasks. Each call
/// to [`send`](Self::send) keeps its own attempt bookkeeping, so concurrent
/// requests never affect each other's retry budget.
///
/// Dropping the future returned by `send` cancels whichever call (original,
/// refresh or replay) is in flight.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn Refresher>,
    store: Arc<dyn CredentialStore>,
    session: SessionState,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    refresh_mode: RefreshMode,
    /// Holds the failure of the last completed refresh, if it failed.
    refresh_gate: Mutex<Option<RefreshFailure>>,
    /// Bumped each time a refresh completes in single-flight mode.
    refresh_generation: AtomicU64,
}

/// Builder for [`ApiClient`].
///
/// Only the transport and the refresher are required. The store defaults to
/// an empty [`MemoryCredentialStore`], the session to a fresh anonymous
/// [`SessionState`] and the navigator to [`NoopNavigator`].
pub struct ApiClientBuilder {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn Refresher>,
    store: Option<Arc<dyn CredentialStore>>,
    session: Option<SessionState>,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,
    refresh_mode: RefreshMode,
}

impl ApiClientBuilder {
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn session(mut self, session: SessionState) -> Self {
        self.session = Some(session);
        self
    }

    /// Register the callback invoked on session teardown.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    /// Take the login path and refresh mode from a [`ClientConfig`].
    pub fn config(self, config: &ClientConfig) -> Self {
        self.login_path(config.login_path.clone())
            .refresh_mode(config.refresh_mode)
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                refresher: self.refresher,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
                session: self.session.unwrap_or_default(),
                navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
                login_path: self.login_path,
                refresh_mode: self.refresh_mode,
                refresh_gate: Mutex::new(None),
                refresh_generation: AtomicU64::new(0),
            }),
        }
    }
}

impl ApiClient {
    pub fn builder(transport: Arc<dyn Transport>, refresher: Arc<dyn Refresher>) -> ApiClientBuilder {
        ApiClientBuilder {
            transport,
            refresher,
            store: None,
            session: None,
            navigator: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_mode: RefreshMode::default(),
        }
    }

    /// Perform one logical request.
    ///
    /// Any response other than 401 is returned unchanged, whatever its status.
    /// Use [`ApiResponse::error_for_status`] to treat non-success statuses as
    /// errors.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if no response was obtained. No refresh happens.
    /// - [`Error::Auth`] if the credential could not be recovered. The session
    ///   has already been torn down when this is returned.
    /// - [`Error::Storage`] if the credential store failed.
    #[instrument(
        skip(self, request),
        fields(request_id = %Uuid::new_v4(), method = %request.method(), path = request.path())
    )]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut attempt = Attempt::Initial;

        loop {
            let generation = self.inner.refresh_generation.load(Ordering::SeqCst);
            let response = self.dispatch(&request).await?;

            if !response.is_auth_expired() {
                debug!(status = response.status(), ?attempt, "Request completed");
                return Ok(response);
            }

            match attempt {
                Attempt::Retry => {
                    warn!("Credential rejected again after refresh");
                    self.teardown().await;
                    return Err(AuthError::Rejected(response.to_api_error()).into());
                }
                Attempt::Initial => {
                    info!("Credential expired, refreshing");
                    attempt = Attempt::Retry;
                    self.recover(generation).await?;
                }
            }
        }
    }

    /// Store a freshly issued credential and mark the session authenticated.
    pub async fn install_credential(&self, credential: Credential) -> Result<()> {
        self.inner.store.set(credential).await?;
        self.inner.session.authenticate();
        Ok(())
    }

    /// End the session locally without signalling navigation.
    pub async fn end_session(&self) -> Result<()> {
        self.inner.session.clear();
        self.inner.store.clear().await
    }

    /// Returns the credential currently in the store.
    pub async fn current_credential(&self) -> Result<Option<Credential>> {
        self.inner.store.get().await
    }

    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.inner.refresh_mode
    }

    /// Attach the current credential, if any, and hand the request to the
    /// transport.
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let credential = self.inner.store.get().await?;
        let outbound = match &credential {
            Some(credential) => request.authorized(credential)?,
            None => {
                debug!("No credential stored, sending unauthenticated");
                request.anonymous()
            }
        };

        let response = self
            .inner
            .transport
            .execute(outbound)
            .await
            .map_err(Error::Transport)?;

        Ok(response)
    }

    /// Obtain a replacement credential, or tear the session down.
    ///
    /// `seen` is the refresh generation observed before the rejected request
    /// was sent. In single-flight mode a refresh that completed after that
    /// point is shared: its new credential is replayed, or its failure is
    /// returned without another refresh or navigation.
    async fn recover(&self, seen: u64) -> Result<()> {
        match self.inner.refresh_mode {
            RefreshMode::PerRequest => self.refresh().await.map_err(Into::into),
            RefreshMode::SingleFlight => {
                let mut last_failure = self.inner.refresh_gate.lock().await;

                if self.inner.refresh_generation.load(Ordering::SeqCst) != seen {
                    return match last_failure.as_ref() {
                        None => {
                            debug!("Credential already rotated by a concurrent refresh");
                            Ok(())
                        }
                        Some(failure) => {
                            debug!("Concurrent refresh failed, sharing its outcome");
                            Err(AuthError::RefreshFailed(failure.clone()).into())
                        }
                    };
                }

                let outcome = self.refresh().await;
                *last_failure = match &outcome {
                    Err(RefreshError::Failed(failure)) => Some(failure.clone()),
                    _ => None,
                };
                self.inner.refresh_generation.fetch_add(1, Ordering::SeqCst);
                outcome.map_err(Into::into)
            }
        }
    }

    async fn refresh(&self) -> std::result::Result<(), RefreshError> {
        match self.inner.refresher.refresh().await {
            RefreshOutcome::Success(credential) => {
                debug!("Refresh succeeded, replaying request");
                self.install_credential(credential)
                    .await
                    .map_err(RefreshError::Install)
            }
            RefreshOutcome::Failure(failure) => {
                warn!(error = %failure, "Refresh failed");
                self.teardown().await;
                Err(RefreshError::Failed(failure))
            }
        }
    }

    /// Terminal branch: forget the credential and send the user to login.
    async fn teardown(&self) {
        info!(login_path = %self.inner.login_path, "Tearing down session");
        self.inner.session.clear();
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear credential store");
        }
        self.inner.navigator.navigate(&self.inner.login_path);
    }
}

/// Why a refresh did not install a credential.
enum RefreshError {
    /// The refresher failed; the session has been torn down.
    Failed(RefreshFailure),
    /// The new credential could not be stored.
    Install(Error),
}

impl From<RefreshError> for Error {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Failed(failure) => AuthError::RefreshFailed(failure).into(),
            RefreshError::Install(err) => err,
        }
    }
}

// Custom Debug impl that hides collaborators
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.inner.session.status())
            .field("login_path", &self.inner.login_path)
            .field("refresh_mode", &self.inner.refresh_mode)
            .finish()
    }
}
