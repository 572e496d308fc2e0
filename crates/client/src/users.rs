//! User profile and activity endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventaic_core::{CompanyId, UserId, UserRole, UserSummary};

use crate::error::ApiError;
use crate::http::{ApiMessage, EventaicClient};

/// Full user profile as returned by `/users/profile` and `/auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    /// User's unique ID.
    pub id: UserId,
    /// Account email address.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Optional display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Optional contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub is_email_verified: bool,
    /// Company the user belongs to, if any.
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    /// Name of that company, if any.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Account creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Most recent login time.
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&UserProfile> for UserSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role,
            company_id: profile.company_id,
            company_name: profile.company_name.clone(),
        }
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserProfileUpdate {
    /// New email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Account activity counters.
#[derive(Debug, Clone, Deserialize)]
pub struct UserActivity {
    /// User these counters belong to.
    pub user_id: UserId,
    /// Ads created over the account's lifetime.
    pub total_ads_created: i64,
    /// Creation time of the most recent ad, if any.
    #[serde(default)]
    pub last_ad_created: Option<DateTime<Utc>>,
    /// Evaluations requested over the account's lifetime.
    pub total_evaluations: i64,
    /// Account creation time.
    pub account_created: DateTime<Utc>,
    /// Most recent login time.
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// One page of users (admin listing).
#[derive(Debug, Clone, Deserialize)]
pub struct UserPage {
    /// Total matching users across all pages.
    pub total: i64,
    /// Current page number (1-based).
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Users on this page.
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

impl EventaicClient {
    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn user_profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/api/v1/users/profile").await
    }

    /// Update the authenticated user's profile and sync the stored summary.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields.
    #[instrument(skip(self, update))]
    pub async fn update_user_profile(
        &self,
        update: &UserProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self.put("/api/v1/users/profile", update).await?;
        self.session().set_user(&UserSummary::from(&profile));
        Ok(profile)
    }

    /// Delete the authenticated user's account.
    ///
    /// The server-side account is removed; the local session is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the deletion is refused.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<ApiMessage, ApiError> {
        let message: ApiMessage = self.delete_json("/api/v1/users/profile").await?;
        self.clear_auth();
        Ok(message)
    }

    /// Fetch the authenticated user's activity counters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn user_activity(&self) -> Result<UserActivity, ApiError> {
        self.get("/api/v1/users/activity").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_to_summary_conversion() {
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "email": "a@b.com",
                "username": "ada",
                "full_name": "Ada Lovelace",
                "role": "super_admin",
                "is_email_verified": true,
                "company_id": null,
                "company_name": null
            }"#,
        )
        .expect("deserialize");

        let summary = UserSummary::from(&profile);
        assert_eq!(summary.email, "a@b.com");
        assert_eq!(summary.role, UserRole::SuperAdmin);
        assert_eq!(summary.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_profile_tolerates_null_timestamps() {
        // /auth/me serializes timestamps as null for fresh accounts.
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "email": "a@b.com",
                "username": "ada",
                "role": "company",
                "created_at": null,
                "last_login": null
            }"#,
        )
        .expect("deserialize");
        assert!(profile.created_at.is_none());
        assert!(profile.last_login.is_none());
    }

    #[test]
    fn test_profile_update_serializes_only_set_fields() {
        let update = UserProfileUpdate {
            full_name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json.as_object().expect("object").len(), 1);
        assert_eq!(json["full_name"], "Ada Lovelace");
    }
}
