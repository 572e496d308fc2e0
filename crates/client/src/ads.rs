//! Ad generation, regeneration, evaluation, and CRUD endpoints.
//!
//! Generation goes through the platform's AI pipeline and can take far
//! longer than a normal read, so the generation endpoints use an extended
//! per-call timeout.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eventaic_core::{AdId, AdStatus, AdType, CompanyId, Platform};

use crate::error::ApiError;
use crate::http::{EventaicClient, RequestOptions};

/// Timeout for generation/evaluation calls, which run the AI pipeline.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Creative content of an ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdContent {
    /// Ad headline.
    pub headline: String,
    /// Ad body text.
    pub description: String,
    /// Ad slogan.
    pub slogan: String,
    /// Call-to-action text.
    pub cta_text: String,
    /// SEO keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Social media hashtags.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Prompt used for image generation.
    #[serde(default)]
    pub image_prompt: String,
    /// Inline image data, when the server embeds it.
    #[serde(default)]
    pub image_base64: Option<String>,
    /// URL of the hosted image, when one exists.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Per-platform delivery recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRecommendation {
    /// Recommended platform.
    pub platform: Platform,
    /// Priority ranking (1 = highest).
    pub priority: u8,
    /// Recommended share of budget, in percent.
    pub recommended_budget_percentage: f64,
    /// Optimal posting times.
    #[serde(default)]
    pub best_posting_times: Vec<String>,
    /// Estimated audience reach.
    #[serde(default)]
    pub estimated_reach: Option<i64>,
    /// Estimated click-through rate.
    #[serde(default)]
    pub estimated_ctr: Option<f64>,
    /// Free-form platform notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A generated ad.
#[derive(Debug, Clone, Deserialize)]
pub struct Ad {
    /// Ad's unique ID.
    pub id: AdId,
    /// Event that triggered the generation.
    pub event_name: String,
    /// Specific product, when one was named.
    #[serde(default)]
    pub product_name: Option<String>,
    /// Product categories the ad targets.
    #[serde(default)]
    pub product_categories: Vec<String>,
    /// Target location, when one was named.
    #[serde(default)]
    pub location: Option<String>,
    /// Owning company.
    pub company_id: CompanyId,
    /// Owning company's name.
    pub company_name: String,
    /// Creative content.
    pub content: AdContent,
    /// Recommended platforms.
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Per-platform recommendation details, keyed by platform name.
    #[serde(default)]
    pub platform_details: serde_json::Value,
    /// Lifecycle status.
    pub status: AdStatus,
    /// Operation that produced this record.
    pub ad_type: AdType,
    /// Overall evaluation score, once evaluated.
    #[serde(default)]
    pub evaluation_score: Option<f64>,
    /// Full evaluation payload, once evaluated.
    #[serde(default)]
    pub evaluation_details: Option<serde_json::Value>,
    /// How many times this ad has been regenerated.
    #[serde(default)]
    pub regeneration_count: i32,
    /// Ad this one was regenerated from, if any.
    #[serde(default)]
    pub parent_ad_id: Option<AdId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Evaluation time, once evaluated.
    #[serde(default)]
    pub evaluated_at: Option<DateTime<Utc>>,
}

/// One page of ads.
#[derive(Debug, Clone, Deserialize)]
pub struct AdPage {
    /// Total matching ads across all pages.
    pub total: i64,
    /// Current page number (1-based).
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Ads on this page.
    #[serde(default)]
    pub ads: Vec<Ad>,
}

/// Input for ad generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateAdRequest {
    /// Event triggering the ad (required).
    pub event_name: String,
    /// Specific product name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Product categories (1-10 entries).
    pub product_categories: Vec<String>,
    /// Target location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Company name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Input for ad regeneration.
#[derive(Debug, Clone, Serialize)]
pub struct RegenerateAdRequest {
    /// Ad to regenerate.
    pub ad_id: AdId,
    /// When true, only the image is regenerated.
    pub regenerate_image: bool,
    /// Extra instructions for the regeneration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
}

#[derive(Serialize)]
struct EvaluateBody {
    ad_id: AdId,
}

#[derive(Serialize)]
struct GenerateImageBody {
    ad_id: AdId,
    force_regenerate: bool,
}

/// Quality evaluation of an ad.
#[derive(Debug, Clone, Deserialize)]
pub struct Evaluation {
    /// Evaluated ad.
    pub ad_id: AdId,
    /// Relevance to the triggering event (0-10).
    pub relevance_score: f64,
    /// Clarity of the copy (0-10).
    pub clarity_score: f64,
    /// Persuasiveness of the copy (0-10).
    pub persuasiveness_score: f64,
    /// Brand safety (0-10).
    pub brand_safety_score: f64,
    /// Overall score (0-10).
    pub overall_score: f64,
    /// Free-form feedback.
    pub feedback: String,
    /// Actionable recommendations.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// When the evaluation ran.
    pub evaluated_at: DateTime<Utc>,
}

/// Result of an image generation call.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    /// Ad the image belongs to.
    pub ad_id: AdId,
    /// Public URL of the generated image.
    pub image_url: String,
    /// Prompt used for the generation.
    pub image_prompt: String,
    /// When the image was generated.
    pub generated_at: DateTime<Utc>,
}

/// Query parameters for the ad listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdListQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Page size (1-100).
    pub per_page: u32,
    /// Restrict to a single lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdStatus>,
}

impl Default for AdListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            status: None,
        }
    }
}

impl EventaicClient {
    /// Generate a new ad for an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected inputs,
    /// [`ApiError::RequestFailed`] when the company's monthly limit is
    /// exhausted.
    #[instrument(skip(self, request), fields(event = %request.event_name))]
    pub async fn generate_ad(&self, request: &GenerateAdRequest) -> Result<Ad, ApiError> {
        self.post_with(
            "/api/v1/ads/generate",
            request,
            RequestOptions {
                timeout: Some(GENERATION_TIMEOUT),
            },
        )
        .await
    }

    /// Regenerate an existing ad (or just its image).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] when the ad does not exist or
    /// belongs to another company.
    #[instrument(skip(self, request), fields(ad_id = %request.ad_id))]
    pub async fn regenerate_ad(&self, request: &RegenerateAdRequest) -> Result<Ad, ApiError> {
        self.post_with(
            "/api/v1/ads/regenerate",
            request,
            RequestOptions {
                timeout: Some(GENERATION_TIMEOUT),
            },
        )
        .await
    }

    /// Generate (or force-regenerate) the image for an ad.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] when the ad does not exist.
    #[instrument(skip(self))]
    pub async fn generate_image(
        &self,
        ad_id: AdId,
        force_regenerate: bool,
    ) -> Result<GeneratedImage, ApiError> {
        self.post_with(
            "/api/v1/ads/generate-image",
            &GenerateImageBody {
                ad_id,
                force_regenerate,
            },
            RequestOptions {
                timeout: Some(GENERATION_TIMEOUT),
            },
        )
        .await
    }

    /// Run a quality evaluation over an ad.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] when the ad does not exist.
    #[instrument(skip(self))]
    pub async fn evaluate_ad(&self, ad_id: AdId) -> Result<Evaluation, ApiError> {
        self.post_with(
            "/api/v1/ads/evaluate",
            &EvaluateBody { ad_id },
            RequestOptions {
                timeout: Some(GENERATION_TIMEOUT),
            },
        )
        .await
    }

    /// List the company's ads, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the session cannot be
    /// recovered.
    #[instrument(skip(self, query))]
    pub async fn list_ads(&self, query: &AdListQuery) -> Result<AdPage, ApiError> {
        self.get_query("/api/v1/ads/", query).await
    }

    /// Fetch a single ad.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the ad does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn get_ad(&self, ad_id: AdId) -> Result<Ad, ApiError> {
        self.get(&format!("/api/v1/ads/{ad_id}")).await
    }

    /// Delete an ad.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the ad does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn delete_ad(&self, ad_id: AdId) -> Result<(), ApiError> {
        self.delete(&format!("/api/v1/ads/{ad_id}")).await
    }

    /// Fetch an ad's regeneration history (the ad plus every regeneration
    /// derived from it).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] with a 404 when the ad does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn ad_history(&self, ad_id: AdId) -> Result<Vec<Ad>, ApiError> {
        self.get(&format!("/api/v1/ads/{ad_id}/history")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ad_json() -> serde_json::Value {
        serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "event_name": "Black Friday",
            "product_categories": ["electronics"],
            "company_id": "660e8400-e29b-41d4-a716-446655440000",
            "company_name": "Initech",
            "content": {
                "headline": "Half Price Everything",
                "description": "One day only.",
                "slogan": "Go big",
                "cta_text": "Shop now",
                "keywords": ["sale"],
                "hashtags": ["#blackfriday"],
                "image_prompt": "storefront at night"
            },
            "platforms": ["google_ads", "meta_ads"],
            "platform_details": {},
            "status": "generated",
            "ad_type": "product_gen",
            "regeneration_count": 0,
            "created_at": "2025-11-28T00:00:00Z",
            "updated_at": "2025-11-28T00:00:00Z"
        })
    }

    #[test]
    fn test_ad_deserializes() {
        let ad: Ad = serde_json::from_value(sample_ad_json()).expect("deserialize");
        assert_eq!(ad.event_name, "Black Friday");
        assert_eq!(ad.status, AdStatus::Generated);
        assert_eq!(ad.platforms, vec![Platform::GoogleAds, Platform::MetaAds]);
        assert!(ad.evaluation_score.is_none());
        assert!(ad.parent_ad_id.is_none());
    }

    #[test]
    fn test_ad_page_deserializes() {
        let page: AdPage = serde_json::from_value(serde_json::json!({
            "total": 1,
            "page": 1,
            "per_page": 20,
            "ads": [sample_ad_json()]
        }))
        .expect("deserialize");
        assert_eq!(page.total, 1);
        assert_eq!(page.ads.len(), 1);
    }

    // Query structs are fed to reqwest's form encoder; asserting over the
    // JSON projection checks the same field set.
    #[test]
    fn test_list_query_serializes_status_filter() {
        let query = AdListQuery {
            status: Some(AdStatus::Evaluated),
            ..Default::default()
        };
        let encoded = serde_json::to_value(&query).expect("serialize");
        assert_eq!(encoded["status"], "evaluated");
        assert_eq!(encoded["page"], 1);
    }

    #[test]
    fn test_list_query_omits_absent_status() {
        let encoded = serde_json::to_value(AdListQuery::default()).expect("serialize");
        assert!(encoded.get("status").is_none());
    }

    #[test]
    fn test_generate_request_omits_absent_fields() {
        let request = GenerateAdRequest {
            event_name: "Black Friday".to_string(),
            product_name: None,
            product_categories: vec!["electronics".to_string()],
            location: None,
            company_name: None,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("product_name").is_none());
        assert!(json.get("location").is_none());
    }
}
