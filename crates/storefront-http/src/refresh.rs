//! Client for the credential refresh endpoint.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use storefront_core::error::RefreshFailure;
use storefront_core::{BaseUrl, Credential, RefreshOutcome, Refresher};

use crate::error::transport_error;
use crate::transport::read_response;

/// Calls the refresh endpoint with the ambient session cookie.
///
/// Sends one `POST` with no body and no `Authorization` header. The new
/// credential is the string in the response envelope's `data` field.
#[derive(Debug, Clone)]
pub struct HttpRefreshClient {
    client: reqwest::Client,
    url: String,
}

impl HttpRefreshClient {
    /// `client` must share its cookie jar with the main transport.
    pub fn new(client: reqwest::Client, base: &BaseUrl, path: &str) -> Self {
        Self {
            client,
            url: base.endpoint(path),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn try_refresh(&self) -> Result<Credential, RefreshFailure> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport(transport_error(e)))?;

        let response = read_response(response)
            .await
            .map_err(RefreshFailure::Transport)?;

        if !response.is_success() {
            return Err(RefreshFailure::Status(response.to_api_error()));
        }

        match response.data::<String>() {
            Ok(Some(token)) if !token.is_empty() => Ok(Credential::new(token)),
            Ok(_) => Err(RefreshFailure::MissingCredential),
            Err(e) => {
                debug!(error = %e, "Refresh response body not usable");
                Err(RefreshFailure::MissingCredential)
            }
        }
    }
}

#[async_trait]
impl Refresher for HttpRefreshClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn refresh(&self) -> RefreshOutcome {
        match self.try_refresh().await {
            Ok(credential) => {
                debug!("Obtained new credential");
                RefreshOutcome::Success(credential)
            }
            Err(failure) => {
                warn!(error = %failure, "Refresh endpoint did not issue a credential");
                RefreshOutcome::Failure(failure)
            }
        }
    }
}
