//! Company dashboard, usage, and profile endpoints.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventaic_core::CompanyId;

use crate::error::ApiError;
use crate::http::EventaicClient;

/// Company profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyProfile {
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
    /// Whether the company has been verified by the platform.
    #[serde(default)]
    pub is_verified: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Partial company profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyProfileUpdate {
    /// New company name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New website.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// New street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// New country.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// New industry sector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// New size bracket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Company dashboard summary.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyDashboard {
    /// Company these numbers belong to.
    pub company_id: CompanyId,
    /// Company name.
    pub company_name: String,
    /// Ads generated over the company's lifetime.
    pub total_ads_generated: i64,
    /// Ads generated in the current calendar month.
    pub ads_generated_this_month: i64,
    /// Monthly generation allowance.
    pub monthly_limit: i64,
    /// Mean overall evaluation score, when any ad has been evaluated.
    #[serde(default)]
    pub average_evaluation_score: Option<f64>,
    /// Most recent ads, abbreviated.
    #[serde(default)]
    pub recent_ads: Vec<serde_json::Value>,
}

/// Company usage breakdown for a reporting period.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyUsage {
    /// Company these numbers belong to.
    pub company_id: CompanyId,
    /// Period start.
    pub period_start: DateTime<Utc>,
    /// Period end.
    pub period_end: DateTime<Utc>,
    /// Ads generated in the period.
    pub total_generated: i64,
    /// Regenerations in the period.
    pub total_regenerated: i64,
    /// Evaluations in the period.
    pub total_evaluated: i64,
    /// Per-day activity.
    #[serde(default)]
    pub daily_breakdown: Vec<serde_json::Value>,
    /// Ads per recommended platform.
    #[serde(default)]
    pub platform_distribution: HashMap<String, i64>,
    /// Generations left this month.
    pub remaining_monthly_limit: i64,
}

impl EventaicClient {
    /// Fetch the company dashboard for the authenticated user's company.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn company_dashboard(&self) -> Result<CompanyDashboard, ApiError> {
        self.get("/api/v1/company/dashboard").await
    }

    /// Fetch the company's usage breakdown for the current period.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn company_usage(&self) -> Result<CompanyUsage, ApiError> {
        self.get("/api/v1/company/usage").await
    }

    /// Fetch the company profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn company_profile(&self) -> Result<CompanyProfile, ApiError> {
        self.get("/api/v1/company/profile").await
    }

    /// Update the company profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields.
    #[instrument(skip(self, update))]
    pub async fn update_company_profile(
        &self,
        update: &CompanyProfileUpdate,
    ) -> Result<CompanyProfile, ApiError> {
        self.put("/api/v1/company/profile", update).await
    }

    /// Fetch ad statistics for the company.
    ///
    /// The payload shape varies with the reporting window, so it is exposed
    /// as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self))]
    pub async fn company_ad_statistics(&self) -> Result<serde_json::Value, ApiError> {
        self.get("/api/v1/company/ads/statistics").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_deserializes() {
        let dashboard: CompanyDashboard = serde_json::from_value(serde_json::json!({
            "company_id": "660e8400-e29b-41d4-a716-446655440000",
            "company_name": "Initech",
            "total_ads_generated": 42,
            "ads_generated_this_month": 7,
            "monthly_limit": 100,
            "average_evaluation_score": 8.4,
            "recent_ads": []
        }))
        .expect("deserialize");
        assert_eq!(dashboard.company_name, "Initech");
        assert_eq!(dashboard.monthly_limit, 100);
    }

    #[test]
    fn test_dashboard_tolerates_missing_average() {
        // No evaluated ads yet: the backend sends null.
        let dashboard: CompanyDashboard = serde_json::from_value(serde_json::json!({
            "company_id": "660e8400-e29b-41d4-a716-446655440000",
            "company_name": "Initech",
            "total_ads_generated": 0,
            "ads_generated_this_month": 0,
            "monthly_limit": 100,
            "average_evaluation_score": null,
            "recent_ads": []
        }))
        .expect("deserialize");
        assert!(dashboard.average_evaluation_score.is_none());
    }

    #[test]
    fn test_profile_update_serializes_only_set_fields() {
        let update = CompanyProfileUpdate {
            city: Some("Berlin".to_string()),
            industry: Some("retail".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json.as_object().expect("object").len(), 2);
    }
}
