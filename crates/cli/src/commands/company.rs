//! Company commands: dashboard, usage, profile.

use clap::Subcommand;
use tracing::info;

use eventaic_client::EventaicClient;
use eventaic_client::company::CompanyProfileUpdate;

use super::CliError;

#[derive(Subcommand)]
pub enum CompanyAction {
    /// Show the company dashboard
    Dashboard,
    /// Show usage for the current period
    Usage,
    /// Show the company profile
    Profile,
    /// Update the company profile
    UpdateProfile {
        /// New company name
        #[arg(long)]
        name: Option<String>,

        /// New contact email
        #[arg(long)]
        email: Option<String>,

        /// New contact phone number
        #[arg(long)]
        phone: Option<String>,

        /// New website
        #[arg(long)]
        website: Option<String>,

        /// New city
        #[arg(long)]
        city: Option<String>,

        /// New country
        #[arg(long)]
        country: Option<String>,

        /// New industry sector
        #[arg(long)]
        industry: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },
}

pub async fn run(client: &EventaicClient, action: CompanyAction) -> Result<(), CliError> {
    match action {
        CompanyAction::Dashboard => {
            let dashboard = client.company_dashboard().await?;
            info!("Company: {}", dashboard.company_name);
            info!(
                "Ads this month: {}/{}",
                dashboard.ads_generated_this_month, dashboard.monthly_limit
            );
            info!("Total ads: {}", dashboard.total_ads_generated);
            match dashboard.average_evaluation_score {
                Some(score) => info!("Average evaluation score: {score:.1}/10"),
                None => info!("Average evaluation score: no evaluated ads yet"),
            }
        }
        CompanyAction::Usage => {
            let usage = client.company_usage().await?;
            info!("Period: {} to {}", usage.period_start, usage.period_end);
            info!(
                "Generated {}, regenerated {}, evaluated {}",
                usage.total_generated, usage.total_regenerated, usage.total_evaluated
            );
            info!("Remaining this month: {}", usage.remaining_monthly_limit);
            for (platform, count) in &usage.platform_distribution {
                info!("  {platform}: {count}");
            }
        }
        CompanyAction::Profile => {
            let profile = client.company_profile().await?;
            info!("Company: {} ({})", profile.name, profile.id);
            if let Some(website) = &profile.website {
                info!("Website: {website}");
            }
            if let Some(industry) = &profile.industry {
                info!("Industry: {industry}");
            }
            info!("Verified: {}", profile.is_verified);
        }
        CompanyAction::UpdateProfile {
            name,
            email,
            phone,
            website,
            city,
            country,
            industry,
            description,
        } => {
            let profile = client
                .update_company_profile(&CompanyProfileUpdate {
                    name,
                    email,
                    phone,
                    website,
                    city,
                    country,
                    industry,
                    description,
                    ..Default::default()
                })
                .await?;
            info!("Updated profile for {}", profile.name);
        }
    }
    Ok(())
}
