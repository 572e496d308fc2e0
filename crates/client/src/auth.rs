//! Authentication endpoints: login, registration, token grants, and
//! password management.
//!
//! Successful login/registration persists the returned grant through the
//! [`crate::SessionManager`], after which every call carries the new bearer
//! token.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use eventaic_core::UserSummary;

use crate::error::ApiError;
use crate::http::{ApiMessage, EventaicClient};
use crate::users::UserProfile;

/// Token grant returned by login, registration, and refresh.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    /// Short-lived bearer credential for API calls.
    pub access_token: String,
    /// Longer-lived credential exchanged for new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token scheme; the backend always issues `bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Identity of the authenticated user, when the server includes it.
    #[serde(default)]
    pub user: Option<UserSummary>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// Request body for the token-refresh exchange.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// New-account registration input.
#[derive(Clone)]
pub struct RegisterRequest {
    /// Account email address.
    pub email: String,
    /// Login name (letters, digits, underscores, hyphens).
    pub username: String,
    /// Account password.
    pub password: SecretString,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Company to create alongside the account.
    pub company_name: Option<String>,
    /// Optional contact phone number.
    pub phone: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("company_name", &self.company_name)
            .field("phone", &self.phone)
            .finish()
    }
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Serialize)]
struct ChangePasswordBody<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct PasswordResetBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordResetConfirmBody<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

impl EventaicClient {
    /// Log in with a username OR email plus password.
    ///
    /// On success the grant is persisted: subsequent calls attach the new
    /// access token and subscribers receive a
    /// [`crate::SessionEvent::Updated`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with the server's message on bad
    /// credentials, [`ApiError::Network`] when the backend is unreachable.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenGrant, ApiError> {
        let grant: TokenGrant = self
            .post(
                "/api/v1/auth/login",
                &LoginBody {
                    username,
                    password: password.expose_secret(),
                },
            )
            .await?;

        self.session().apply(&grant);
        Ok(grant)
    }

    /// Register a new account. The returned grant is persisted exactly as
    /// for [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields (weak password,
    /// malformed email), [`ApiError::RequestFailed`] when the email or
    /// username is already taken.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenGrant, ApiError> {
        let grant: TokenGrant = self
            .post(
                "/api/v1/auth/register",
                &RegisterBody {
                    email: &request.email,
                    username: &request.username,
                    password: request.password.expose_secret(),
                    full_name: request.full_name.as_deref(),
                    company_name: request.company_name.as_deref(),
                    phone: request.phone.as_deref(),
                },
            )
            .await?;

        self.session().apply(&grant);
        Ok(grant)
    }

    /// Log out: tell the backend (best-effort) and clear the local session.
    ///
    /// Local clearing proceeds regardless of the server call's outcome, so
    /// this never fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let result: Result<ApiMessage, ApiError> = self.post_empty("/api/v1/auth/logout").await;
        if let Err(e) = result {
            warn!(error = %e, "Server logout failed, clearing session anyway");
        }
        self.clear_auth();
    }

    /// Fetch the authenticated user's full profile and sync the stored
    /// summary to it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self.get("/api/v1/auth/me").await?;
        self.session().set_user(&UserSummary::from(&profile));
        Ok(profile)
    }

    /// Change the authenticated user's password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] when the current password is
    /// wrong, [`ApiError::Validation`] when the new one is rejected.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<ApiMessage, ApiError> {
        self.post(
            "/api/v1/auth/change-password",
            &ChangePasswordBody {
                current_password: current_password.expose_secret(),
                new_password: new_password.expose_secret(),
            },
        )
        .await
    }

    /// Ask for a password-reset email. The backend answers success whether
    /// or not the address exists.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when the backend is unreachable.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<ApiMessage, ApiError> {
        self.post("/api/v1/auth/password-reset/request", &PasswordResetBody { email })
            .await
    }

    /// Complete a password reset with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] for an invalid or expired token.
    #[instrument(skip_all)]
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &SecretString,
    ) -> Result<ApiMessage, ApiError> {
        self.post(
            "/api/v1/auth/password-reset/confirm",
            &PasswordResetConfirmBody {
                token,
                new_password: new_password.expose_secret(),
            },
        )
        .await
    }

    /// Verify an email address with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] for an invalid or expired token.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<ApiMessage, ApiError> {
        self.post("/api/v1/auth/verify-email", &TokenBody { token })
            .await
    }

    /// Re-send the verification email for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] when the email is already
    /// verified.
    #[instrument(skip(self))]
    pub async fn resend_verification(&self) -> Result<ApiMessage, ApiError> {
        self.post_empty("/api/v1/auth/resend-verification").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_grant_tolerates_minimal_response() {
        // The refresh endpoint only promises an access token.
        let grant: TokenGrant =
            serde_json::from_str(r#"{"access_token": "T2"}"#).expect("deserialize");
        assert_eq!(grant.access_token, "T2");
        assert!(grant.refresh_token.is_none());
        assert!(grant.user.is_none());
    }

    #[test]
    fn test_token_grant_full_response() {
        let json = r#"{
            "access_token": "T1",
            "refresh_token": "R1",
            "token_type": "bearer",
            "expires_in": 1800,
            "user": {
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "email": "a@b.com",
                "username": "ada",
                "role": "company"
            }
        }"#;
        let grant: TokenGrant = serde_json::from_str(json).expect("deserialize");
        assert_eq!(grant.access_token, "T1");
        assert_eq!(grant.refresh_token.as_deref(), Some("R1"));
        assert_eq!(grant.expires_in, Some(1800));
        assert_eq!(grant.user.expect("user present").email, "a@b.com");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let grant: TokenGrant = serde_json::from_str(
            r#"{"access_token": "super-secret-access", "refresh_token": "super-secret-refresh"}"#,
        )
        .expect("deserialize");

        let debug_output = format!("{grant:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-access"));
        assert!(!debug_output.contains("super-secret-refresh"));
    }

    #[test]
    fn test_register_debug_redacts_password() {
        let request = RegisterRequest {
            email: "a@b.com".to_string(),
            username: "ada".to_string(),
            password: SecretString::from("hunter2-Secret!"),
            full_name: None,
            company_name: Some("Initech".to_string()),
            phone: None,
        };

        let debug_output = format!("{request:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-Secret!"));
    }

    #[test]
    fn test_register_body_skips_absent_fields() {
        let body = RegisterBody {
            email: "a@b.com",
            username: "ada",
            password: "pw",
            full_name: None,
            company_name: None,
            phone: None,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("full_name").is_none());
        assert!(json.get("company_name").is_none());
    }
}
