//! Domain enums for users, ads, and delivery platforms.
//!
//! All variants serialize as `snake_case` strings, matching the Eventaic
//! API's wire format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role attached to every user account.
///
/// `Company` users see only their own company's data; `SuperAdmin` users have
/// access to the platform-wide admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    #[default]
    Company,
}

impl UserRole {
    /// Whether this role grants access to the admin endpoints.
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Company => "company",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`UserRole`] from a string.
#[derive(Debug, Error)]
#[error("unknown role: {0}. Valid roles: super_admin, company")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for UserRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "company" => Ok(Self::Company),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Lifecycle status of an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    #[default]
    Draft,
    Generated,
    Regenerated,
    Evaluated,
    Published,
}

impl AdStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Generated => "generated",
            Self::Regenerated => "regenerated",
            Self::Evaluated => "evaluated",
            Self::Published => "published",
        }
    }
}

impl std::fmt::Display for AdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`AdStatus`] from a string.
#[derive(Debug, Error)]
#[error("unknown ad status: {0}. Valid statuses: draft, generated, regenerated, evaluated, published")]
pub struct AdStatusParseError(pub String);

impl std::str::FromStr for AdStatus {
    type Err = AdStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "generated" => Ok(Self::Generated),
            "regenerated" => Ok(Self::Regenerated),
            "evaluated" => Ok(Self::Evaluated),
            "published" => Ok(Self::Published),
            other => Err(AdStatusParseError(other.to_string())),
        }
    }
}

/// Kind of generation operation that produced an ad record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    ProductGen,
    Regen,
    RegenImage,
    Evaluate,
}

/// Advertising platform an ad can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GoogleAds,
    MetaAds,
    Linkedin,
    Twitter,
    Instagram,
    Tiktok,
}

impl Platform {
    /// Wire representation of the platform.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleAds => "google_ads",
            Self::MetaAds => "meta_ads",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).expect("serialize"),
            "\"super_admin\""
        );
        let role: UserRole = serde_json::from_str("\"company\"").expect("deserialize");
        assert_eq!(role, UserRole::Company);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("super_admin".parse::<UserRole>().expect("parse"), UserRole::SuperAdmin);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_is_super_admin() {
        assert!(UserRole::SuperAdmin.is_super_admin());
        assert!(!UserRole::Company.is_super_admin());
    }

    #[test]
    fn test_ad_status_round_trip() {
        for status in [
            AdStatus::Draft,
            AdStatus::Generated,
            AdStatus::Regenerated,
            AdStatus::Evaluated,
            AdStatus::Published,
        ] {
            let json = serde_json::to_string(&status).expect("serialize");
            assert_eq!(json, format!("\"{status}\""));
            let back: AdStatus = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_ad_status_from_str() {
        assert_eq!("evaluated".parse::<AdStatus>().expect("parse"), AdStatus::Evaluated);
        assert!("archived".parse::<AdStatus>().is_err());
    }

    #[test]
    fn test_platform_wire_names() {
        assert_eq!(
            serde_json::to_string(&Platform::GoogleAds).expect("serialize"),
            "\"google_ads\""
        );
        assert_eq!(
            serde_json::to_string(&Platform::MetaAds).expect("serialize"),
            "\"meta_ads\""
        );
        let platform: Platform = serde_json::from_str("\"tiktok\"").expect("deserialize");
        assert_eq!(platform, Platform::Tiktok);
    }
}
