//! The session user summary.

use serde::{Deserialize, Serialize};

use super::id::{CompanyId, UserId};
use super::status::UserRole;

/// Minimal user identity returned alongside token grants and persisted in
/// the client-side session.
///
/// The API includes this object in login, registration, and refresh
/// responses. It is treated as an opaque bag: every field except `id` and
/// `email` tolerates absence and falls back to a default, so a partial
/// summary from an older server never fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User's unique ID.
    pub id: UserId,
    /// User's email address.
    pub email: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Optional display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Account role; defaults to `company` when omitted.
    #[serde(default)]
    pub role: UserRole,
    /// Company the user belongs to, if any.
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    /// Name of that company, if any.
    #[serde(default)]
    pub company_name: Option<String>,
}

impl UserSummary {
    /// Human-facing name: the full name when set, the username otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_summary_uses_defaults() {
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","email":"a@b.com"}"#;
        let user: UserSummary = serde_json::from_str(json).expect("deserialize");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.username, "");
        assert_eq!(user.role, UserRole::Company);
        assert!(user.company_id.is_none());
        assert!(user.full_name.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // The backend also sends a derived "name" field; the summary must
        // not reject it.
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "email": "a@b.com",
            "username": "ada",
            "name": "Ada Lovelace",
            "role": "super_admin"
        }"#;
        let user: UserSummary = serde_json::from_str(json).expect("deserialize");
        assert_eq!(user.role, UserRole::SuperAdmin);
        assert_eq!(user.username, "ada");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user: UserSummary = serde_json::from_str(
            r#"{"id":"550e8400-e29b-41d4-a716-446655440000","email":"a@b.com","username":"ada"}"#,
        )
        .expect("deserialize");
        assert_eq!(user.display_name(), "ada");

        user.full_name = Some("Ada Lovelace".to_string());
        assert_eq!(user.display_name(), "Ada Lovelace");
    }
}
