//! Platform-wide admin endpoints (super-admin role required).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventaic_core::CompanyId;

use crate::error::ApiError;
use crate::http::{ApiMessage, EventaicClient};
use crate::users::UserPage;

/// Platform overview for the admin dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminDashboard {
    /// Companies on the platform.
    pub total_companies: i64,
    /// Companies currently active.
    pub active_companies: i64,
    /// Users across all companies.
    pub total_users: i64,
    /// Ads generated over the platform's lifetime.
    pub total_ads_generated: i64,
    /// Ads generated today.
    pub ads_generated_today: i64,
    /// Ads generated in the current calendar month.
    pub ads_generated_this_month: i64,
    /// Regenerations over the platform's lifetime.
    pub total_regenerations: i64,
    /// Mean overall evaluation score across evaluated ads.
    pub average_evaluation_score: f64,
    /// Most recent platform activity entries.
    #[serde(default)]
    pub recent_activities: Vec<serde_json::Value>,
    /// Highest-volume companies.
    #[serde(default)]
    pub top_companies: Vec<serde_json::Value>,
}

/// One page of companies.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyPage {
    /// Total matching companies across all pages.
    pub total: i64,
    /// Current page number (1-based).
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Company rows on this page; shape varies with listing filters.
    #[serde(default)]
    pub companies: Vec<serde_json::Value>,
}

/// Detailed company record with its users and recent ads.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyDetail {
    /// Company's unique ID.
    pub id: CompanyId,
    /// Company name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Company website.
    #[serde(default)]
    pub website: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    /// Industry sector.
    #[serde(default)]
    pub industry: Option<String>,
    /// Company size bracket.
    #[serde(default)]
    pub size: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Monthly generation allowance.
    pub monthly_ad_limit: i64,
    /// Ads generated in the current calendar month.
    pub ads_generated_this_month: i64,
    /// Ads generated over the company's lifetime.
    pub total_ads_generated: i64,
    /// Whether the company can generate ads.
    pub is_active: bool,
    /// Whether the company has been verified.
    pub is_verified: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Users belonging to the company.
    #[serde(default)]
    pub users: Vec<serde_json::Value>,
    /// The company's most recent ads, abbreviated.
    #[serde(default)]
    pub recent_ads: Vec<serde_json::Value>,
}

/// Platform statistics over a reporting period.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminStatistics {
    /// Period start.
    pub period_start: DateTime<Utc>,
    /// Period end.
    pub period_end: DateTime<Utc>,
    /// Ads generated in the period.
    pub total_ads: i64,
    /// Regenerations in the period.
    pub total_regenerations: i64,
    /// Evaluations in the period.
    pub total_evaluations: i64,
    /// Companies that generated at least one ad.
    pub unique_companies: i64,
    /// Users active in the period.
    pub active_users: i64,
    /// Per-day activity.
    #[serde(default)]
    pub daily_stats: Vec<serde_json::Value>,
    /// Ads per recommended platform.
    #[serde(default)]
    pub platform_distribution: HashMap<String, i64>,
    /// Ads per triggering event.
    #[serde(default)]
    pub event_distribution: HashMap<String, i64>,
    /// Best-scoring ads of the period.
    #[serde(default)]
    pub top_performing_ads: Vec<serde_json::Value>,
    /// Companies ranked by volume.
    #[serde(default)]
    pub company_rankings: Vec<serde_json::Value>,
}

/// Query parameters for the company listing.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyListQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Page size (1-100).
    pub per_page: u32,
    /// Substring filter over company names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Restrict to active or inactive companies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Default for CompanyListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
            is_active: None,
        }
    }
}

/// Query parameters for the platform user listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserListQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Page size (1-100).
    pub per_page: u32,
    /// Substring filter over emails and usernames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
        }
    }
}

/// Query parameters for platform statistics. The backend defaults to the
/// last 30 days when no window is given.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatisticsQuery {
    /// Window start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Window end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Restrict to one company.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
}

#[derive(Serialize)]
struct LimitQuery {
    monthly_limit: u32,
}

impl EventaicClient {
    /// Fetch the platform overview.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 403 for non-super-admin
    /// callers.
    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ApiError> {
        self.get("/api/v1/admin/dashboard").await
    }

    /// List companies with pagination and filters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 403 for non-super-admin
    /// callers.
    #[instrument(skip(self, query))]
    pub async fn admin_companies(&self, query: &CompanyListQuery) -> Result<CompanyPage, ApiError> {
        self.get_query("/api/v1/admin/companies", query).await
    }

    /// Fetch one company in detail.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the company does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn admin_company_detail(
        &self,
        company_id: CompanyId,
    ) -> Result<CompanyDetail, ApiError> {
        self.get(&format!("/api/v1/admin/companies/{company_id}"))
            .await
    }

    /// Fetch platform statistics for a reporting window.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 403 for non-super-admin
    /// callers.
    #[instrument(skip(self, query))]
    pub async fn admin_statistics(
        &self,
        query: &StatisticsQuery,
    ) -> Result<AdminStatistics, ApiError> {
        self.get_query("/api/v1/admin/statistics", query).await
    }

    /// Activate a company.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the company does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn activate_company(&self, company_id: CompanyId) -> Result<ApiMessage, ApiError> {
        self.post_empty(&format!("/api/v1/admin/companies/{company_id}/activate"))
            .await
    }

    /// Deactivate a company.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the company does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn deactivate_company(&self, company_id: CompanyId) -> Result<ApiMessage, ApiError> {
        self.post_empty(&format!("/api/v1/admin/companies/{company_id}/deactivate"))
            .await
    }

    /// Update a company's monthly generation allowance (0-10000).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the company does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn update_company_limit(
        &self,
        company_id: CompanyId,
        monthly_limit: u32,
    ) -> Result<ApiMessage, ApiError> {
        self.put_query(
            &format!("/api/v1/admin/companies/{company_id}/limits"),
            &LimitQuery { monthly_limit },
        )
        .await
    }

    /// List users across the platform.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 403 for non-super-admin
    /// callers.
    #[instrument(skip(self, query))]
    pub async fn admin_users(&self, query: &UserListQuery) -> Result<UserPage, ApiError> {
        self.get_query("/api/v1/admin/users", query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_dashboard_deserializes() {
        let dashboard: AdminDashboard = serde_json::from_value(serde_json::json!({
            "total_companies": 12,
            "active_companies": 10,
            "total_users": 48,
            "total_ads_generated": 1024,
            "ads_generated_today": 3,
            "ads_generated_this_month": 96,
            "total_regenerations": 37,
            "average_evaluation_score": 7.9,
            "recent_activities": [],
            "top_companies": []
        }))
        .expect("deserialize");
        assert_eq!(dashboard.total_companies, 12);
        assert!((dashboard.average_evaluation_score - 7.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_company_query_omits_absent_filters() {
        let json = serde_json::to_value(CompanyListQuery::default()).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(object.contains_key("page"));
        assert!(!object.contains_key("search"));
        assert!(!object.contains_key("is_active"));
    }

    #[test]
    fn test_statistics_query_default_is_empty() {
        let json = serde_json::to_value(StatisticsQuery::default()).expect("serialize");
        assert!(json.as_object().expect("object").is_empty());
    }
}
