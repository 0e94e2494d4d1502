//! storefront-http - reqwest-backed collaborators for [`storefront_core::ApiClient`].
//!
//! [`connect`] wires an [`HttpTransport`] and an [`HttpRefreshClient`] that
//! share one cookie-carrying `reqwest::Client`, so the refresh call sees the
//! session cookie the backend set at login. [`connect_with_jar`] takes a
//! [`CookieJar`] that can be persisted between processes.

mod cookies;
mod error;
mod refresh;
mod transport;

use std::sync::Arc;

use tracing::{debug, warn};

use storefront_core::{ApiClient, ClientConfig, CredentialStore, Navigator, Result, SessionState};

pub use cookies::{COOKIES_FILE, CookieJar};
pub use refresh::HttpRefreshClient;
pub use transport::{HttpTransport, build_http_client};

/// Build an [`ApiClient`] for the configured backend with an in-memory
/// cookie jar.
///
/// The session is restored from `store`, so a credential persisted by an
/// earlier run starts the client authenticated.
///
/// # Errors
///
/// Returns an error if no base URL is configured, the HTTP client cannot be
/// built, or the store cannot be read.
pub async fn connect(
    config: &ClientConfig,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
) -> Result<ApiClient> {
    connect_with_jar(config, store, navigator, &CookieJar::in_memory()).await
}

/// Like [`connect`], but cookies go to `jar`.
///
/// A credential restored from `store` can only be refreshed if `jar` still
/// holds the cookie the backend set when that credential was issued. Save the
/// jar when the process is done with the client.
pub async fn connect_with_jar(
    config: &ClientConfig,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    jar: &CookieJar,
) -> Result<ApiClient> {
    let base = config.require_base_url()?.clone();
    if !base.is_secure() && !base.is_loopback() {
        warn!(base = %base, "Backend uses plain HTTP; credentials are sent unencrypted");
    }
    let http = build_http_client(config, jar)?;

    let refresher = HttpRefreshClient::new(http.clone(), &base, &config.refresh_path);
    let transport = HttpTransport::new(http, base);
    let session = SessionState::restore(store.as_ref()).await?;

    debug!(
        base = %transport.base(),
        refresh = refresher.url(),
        mode = %config.refresh_mode,
        "Connected API client"
    );

    Ok(ApiClient::builder(Arc::new(transport), Arc::new(refresher))
        .store(store)
        .session(session)
        .navigator(navigator)
        .config(config)
        .build())
}
