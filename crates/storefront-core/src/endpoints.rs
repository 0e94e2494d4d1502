//! Backend endpoint paths and request/response bodies.

use serde::{Deserialize, Serialize};
use urlencoding::encode;

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const REGISTER: &str = "/auth/register";

pub const SEND_OTP: &str = "/auth/send-otp";

pub const LOGIN: &str = "/auth/login";

pub const LOGOUT: &str = "/auth/logout";

pub const CHANGE_PASSWORD: &str = "/auth/change-password";

/// Sends a password reset link by email.
pub const FORGOT_PASSWORD_LINK: &str = "/auth/forgot-password-token";

/// Returns the signed-in user's profile.
pub const USER_DETAILS: &str = "/auth/user";

/// Exchanges the refresh cookie for a new credential.
pub const REGENERATE_TOKEN: &str = "/auth/regenerate-token";

/// Checks a password reset token before showing the reset form.
pub fn validate_reset_token(token: &str) -> String {
    format!("/auth/validate-forgot-password-token/{}", encode(token))
}

/// Sets a new password with a reset token.
pub fn reset_password(token: &str) -> String {
    format!("/auth/forgot-password/{}", encode(token))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendOtpRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Where the login endpoint puts the credential inside `data`.
///
/// Accepts both `"data": "<token>"` and `"data": { "token": "<token>", ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TokenPayload {
    Bare(String),
    Wrapped {
        token: String,
        #[serde(default)]
        user: Option<serde_json::Value>,
    },
}

impl TokenPayload {
    pub fn token(&self) -> &str {
        match self {
            TokenPayload::Bare(token) => token,
            TokenPayload::Wrapped { token, .. } => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_payload_shapes() {
        let bare: TokenPayload = serde_json::from_value(json!("T1")).unwrap();
        assert_eq!(bare.token(), "T1");

        let wrapped: TokenPayload =
            serde_json::from_value(json!({ "token": "T2", "user": { "_id": "u1" } })).unwrap();
        assert_eq!(wrapped.token(), "T2");

        assert!(serde_json::from_value::<TokenPayload>(json!({ "user": {} })).is_err());
    }

    #[test]
    fn reset_paths_embed_token() {
        assert_eq!(reset_password("abc"), "/auth/forgot-password/abc");
        assert_eq!(
            validate_reset_token("abc"),
            "/auth/validate-forgot-password-token/abc"
        );
    }

    #[test]
    fn reset_token_stays_one_segment() {
        assert_eq!(reset_password("a/b?c#d"), "/auth/forgot-password/a%2Fb%3Fc%23d");
        assert_eq!(
            validate_reset_token("../user"),
            "/auth/validate-forgot-password-token/..%2Fuser"
        );
    }

    #[test]
    fn camel_case_bodies() {
        let body = serde_json::to_value(ChangePasswordRequest {
            old_password: "a",
            new_password: "b",
        })
        .unwrap();
        assert_eq!(body, json!({ "oldPassword": "a", "newPassword": "b" }));
    }
}
