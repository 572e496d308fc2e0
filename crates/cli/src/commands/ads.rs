//! Ad commands: generate, regenerate, evaluate, list, inspect, delete.

use clap::Subcommand;
use tracing::info;

use eventaic_client::EventaicClient;
use eventaic_client::ads::{Ad, AdListQuery, GenerateAdRequest, RegenerateAdRequest};
use eventaic_core::{AdId, AdStatus};

use super::CliError;

#[derive(Subcommand)]
pub enum AdsAction {
    /// List the company's ads
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (1-100)
        #[arg(long, default_value_t = 20)]
        per_page: u32,

        /// Filter by status (draft, generated, regenerated, evaluated, published)
        #[arg(long)]
        status: Option<AdStatus>,
    },
    /// Show a single ad
    Get {
        /// Ad ID
        id: AdId,
    },
    /// Generate a new ad for an event
    Generate {
        /// Event triggering the ad
        #[arg(long)]
        event: String,

        /// Product categories (repeat for multiple)
        #[arg(long = "category", required = true)]
        categories: Vec<String>,

        /// Specific product name
        #[arg(long)]
        product: Option<String>,

        /// Target location
        #[arg(long)]
        location: Option<String>,

        /// Company name override
        #[arg(long)]
        company: Option<String>,
    },
    /// Regenerate an existing ad
    Regenerate {
        /// Ad ID
        id: AdId,

        /// Only regenerate the image
        #[arg(long)]
        image_only: bool,

        /// Extra instructions for the regeneration
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Run a quality evaluation over an ad
    Evaluate {
        /// Ad ID
        id: AdId,
    },
    /// Delete an ad
    Delete {
        /// Ad ID
        id: AdId,
    },
    /// Show an ad's regeneration history
    History {
        /// Ad ID
        id: AdId,
    },
}

pub async fn run(client: &EventaicClient, action: AdsAction) -> Result<(), CliError> {
    match action {
        AdsAction::List {
            page,
            per_page,
            status,
        } => {
            let ads = client
                .list_ads(&AdListQuery {
                    page,
                    per_page,
                    status,
                })
                .await?;
            info!("{} ads (page {} of {} total)", ads.ads.len(), ads.page, ads.total);
            for ad in &ads.ads {
                summarize(ad);
            }
        }
        AdsAction::Get { id } => {
            let ad = client.get_ad(id).await?;
            summarize(&ad);
            info!("  Description: {}", ad.content.description);
            info!("  CTA: {}", ad.content.cta_text);
            if let Some(url) = &ad.content.image_url {
                info!("  Image: {url}");
            }
        }
        AdsAction::Generate {
            event,
            categories,
            product,
            location,
            company,
        } => {
            let ad = client
                .generate_ad(&GenerateAdRequest {
                    event_name: event,
                    product_name: product,
                    product_categories: categories,
                    location,
                    company_name: company,
                })
                .await?;
            info!("Generated ad {}", ad.id);
            summarize(&ad);
        }
        AdsAction::Regenerate {
            id,
            image_only,
            instructions,
        } => {
            let ad = client
                .regenerate_ad(&RegenerateAdRequest {
                    ad_id: id,
                    regenerate_image: image_only,
                    additional_instructions: instructions,
                })
                .await?;
            info!("Regenerated ad {} (revision {})", ad.id, ad.regeneration_count);
            summarize(&ad);
        }
        AdsAction::Evaluate { id } => {
            let evaluation = client.evaluate_ad(id).await?;
            info!("Overall score: {:.1}/10", evaluation.overall_score);
            info!(
                "  relevance {:.1}, clarity {:.1}, persuasiveness {:.1}, brand safety {:.1}",
                evaluation.relevance_score,
                evaluation.clarity_score,
                evaluation.persuasiveness_score,
                evaluation.brand_safety_score,
            );
            info!("Feedback: {}", evaluation.feedback);
            for recommendation in &evaluation.recommendations {
                info!("  - {recommendation}");
            }
        }
        AdsAction::Delete { id } => {
            client.delete_ad(id).await?;
            info!("Deleted ad {id}");
        }
        AdsAction::History { id } => {
            let history = client.ad_history(id).await?;
            info!("{} revisions", history.len());
            for ad in &history {
                summarize(ad);
            }
        }
    }
    Ok(())
}

fn summarize(ad: &Ad) {
    info!(
        "{} [{}] {} - {}",
        ad.id, ad.status, ad.event_name, ad.content.headline
    );
}
