//! Account operations on top of [`ApiClient`].
//!
//! Every call goes through [`ApiClient::send`], so the same credential
//! attachment and refresh rules apply. Login is the one place a credential
//! enters the store from outside the refresh path.

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::Result;
use crate::client::ApiClient;
use crate::credential::Credential;
use crate::endpoints::{self, *};
use crate::error::{Error, ProtocolError};
use crate::request::{ApiRequest, ApiResponse, Envelope};

/// Typed wrappers for the backend's `/auth` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Sign in and install the returned credential.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for rejected credentials and
    /// [`Error::Protocol`] if the response carries no credential.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<Value>> {
        let request = ApiRequest::post(LOGIN).json(&LoginRequest { email, password })?;
        let response = self.client.send(request).await?.error_for_status()?;

        let payload: TokenPayload = response.data()?.ok_or_else(missing_credential)?;

        let token = payload.token();
        if token.is_empty() {
            return Err(missing_credential());
        }

        self.client.install_credential(Credential::new(token)).await?;
        info!("Logged in");

        Ok(match payload {
            TokenPayload::Wrapped { user, .. } => user,
            TokenPayload::Bare(_) => None,
        })
    }

    /// Sign out on the server, then end the local session.
    ///
    /// The local session ends even when the server call fails; that failure
    /// is logged and swallowed. No navigation signal is raised.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        match self.client.send(ApiRequest::post(LOGOUT)).await {
            Ok(response) if !response.is_success() => {
                warn!(status = response.status(), "Server logout rejected");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Server logout failed"),
        }
        self.client.end_session().await?;
        info!("Logged out");
        Ok(())
    }

    /// Fetch the signed-in user's profile (the envelope's `data`).
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Value> {
        let response = self.expect_success(ApiRequest::get(USER_DETAILS)).await?;
        Ok(response.data()?.unwrap_or(Value::Null))
    }

    #[instrument(skip(self))]
    pub async fn send_otp(&self, email: &str) -> Result<Option<String>> {
        let request = ApiRequest::post(SEND_OTP).json(&SendOtpRequest { email })?;
        self.message_of(request).await
    }

    #[instrument(skip(self, registration), fields(email = registration.email))]
    pub async fn register(&self, registration: &RegisterRequest<'_>) -> Result<Option<String>> {
        let request = ApiRequest::post(REGISTER).json(registration)?;
        self.message_of(request).await
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<Option<String>> {
        let request = ApiRequest::post(CHANGE_PASSWORD).json(&ChangePasswordRequest {
            old_password,
            new_password,
        })?;
        self.message_of(request).await
    }

    /// Ask the backend to email a password reset link.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        let request = ApiRequest::post(FORGOT_PASSWORD_LINK).json(&ForgotPasswordRequest { email })?;
        self.message_of(request).await
    }

    /// Returns `Ok(false)` when the backend rejects the token.
    #[instrument(skip_all)]
    pub async fn validate_reset_token(&self, token: &str) -> Result<bool> {
        let response = self
            .client
            .send(ApiRequest::post(endpoints::validate_reset_token(token)))
            .await?;
        match response.error_for_status() {
            Ok(_) => Ok(true),
            Err(Error::Api(api)) if (400..500).contains(&api.status) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<String>> {
        let request = ApiRequest::put(endpoints::reset_password(token)).json(&ResetPasswordRequest {
            password,
            confirm_password,
        })?;
        self.message_of(request).await
    }

    async fn expect_success(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.client.send(request).await?.error_for_status()
    }

    /// Send, require success and return the envelope's `message`.
    async fn message_of(&self, request: ApiRequest) -> Result<Option<String>> {
        let response = self.expect_success(request).await?;
        let envelope: Envelope<Value> = response.json()?;
        Ok(envelope.message)
    }
}

fn missing_credential() -> Error {
    ProtocolError::MissingCredential.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::{RefreshFailure, TransportError};
    use crate::traits::{RefreshOutcome, Refresher, Transport};

    /// Routes by path and records every request.
    struct Backend {
        routes: Vec<(&'static str, u16, Value)>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl Transport for Backend {
        async fn execute(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            let (_, status, body) = self
                .routes
                .iter()
                .find(|(path, _, _)| *path == request.path())
                .cloned()
                .unwrap_or(("", 404, json!({ "message": "not found" })));
            Ok(ApiResponse::with_json(status, &body))
        }
    }

    struct NoRefresh;

    #[async_trait]
    impl Refresher for NoRefresh {
        async fn refresh(&self) -> RefreshOutcome {
            RefreshOutcome::Failure(RefreshFailure::MissingCredential)
        }
    }

    fn api(routes: Vec<(&'static str, u16, Value)>) -> (AuthApi, Arc<Backend>) {
        let backend = Arc::new(Backend {
            routes,
            seen: Mutex::new(Vec::new()),
        });
        let client = ApiClient::builder(backend.clone(), Arc::new(NoRefresh)).build();
        (AuthApi::new(client), backend)
    }

    #[tokio::test]
    async fn login_installs_credential() {
        let (auth, backend) = api(vec![(
            LOGIN,
            200,
            json!({ "success": true, "data": { "token": "T1", "user": { "_id": "u1" } } }),
        )]);

        let user = auth.login("a@shop.example", "pw").await.unwrap();

        assert_eq!(user, Some(json!({ "_id": "u1" })));
        assert!(auth.client().session().is_authenticated());
        assert_eq!(
            auth.client().current_credential().await.unwrap(),
            Some(Credential::new("T1"))
        );
        let seen = backend.seen.lock().unwrap();
        assert_eq!(
            seen[0].body(),
            Some(&json!({ "email": "a@shop.example", "password": "pw" }))
        );
    }

    #[tokio::test]
    async fn login_rejection_is_api_error() {
        let (auth, _) = api(vec![(LOGIN, 400, json!({ "message": "Invalid credentials" }))]);

        match auth.login("a@shop.example", "bad").await.unwrap_err() {
            Error::Api(api) => assert_eq!(api.message.as_deref(), Some("Invalid credentials")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!auth.client().session().is_authenticated());
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let (auth, _) = api(vec![(LOGIN, 200, json!({ "success": true }))]);
        assert!(matches!(
            auth.login("a@shop.example", "pw").await.unwrap_err(),
            Error::Protocol(ProtocolError::MissingCredential)
        ));
        assert_eq!(auth.client().current_credential().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_ends_session_even_if_server_fails() {
        let (auth, _) = api(vec![
            (LOGIN, 200, json!({ "data": "T1" })),
            (LOGOUT, 500, json!({ "message": "boom" })),
        ]);

        auth.login("a@shop.example", "pw").await.unwrap();
        auth.logout().await.unwrap();

        assert!(!auth.client().session().is_authenticated());
        assert_eq!(auth.client().current_credential().await.unwrap(), None);
    }

    #[tokio::test]
    async fn current_user_sends_bearer() {
        let (auth, backend) = api(vec![
            (LOGIN, 200, json!({ "data": "T1" })),
            (USER_DETAILS, 200, json!({ "data": { "email": "a@shop.example" } })),
        ]);

        auth.login("a@shop.example", "pw").await.unwrap();
        let user = auth.current_user().await.unwrap();

        assert_eq!(user["email"], "a@shop.example");
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[1].header_value("authorization"), Some("Bearer T1"));
    }

    #[tokio::test]
    async fn reset_token_validation() {
        let (auth, _) = api(vec![("/auth/validate-forgot-password-token/good", 200, json!({}))]);

        assert!(auth.validate_reset_token("good").await.unwrap());
        assert!(!auth.validate_reset_token("stale").await.unwrap());
    }

    #[tokio::test]
    async fn password_reset_returns_message() {
        let (auth, backend) = api(vec![(
            "/auth/forgot-password/tok",
            200,
            json!({ "message": "Password updated" }),
        )]);

        let message = auth.reset_password("tok", "new", "new").await.unwrap();

        assert_eq!(message.as_deref(), Some("Password updated"));
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].method(), crate::request::Method::Put);
        assert_eq!(
            seen[0].body(),
            Some(&json!({ "password": "new", "confirmPassword": "new" }))
        );
    }
}
