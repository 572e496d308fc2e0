//! Platform administration commands (super-admin accounts).

use clap::Subcommand;
use tracing::info;

use eventaic_client::EventaicClient;
use eventaic_client::admin::{CompanyListQuery, StatisticsQuery, UserListQuery};
use eventaic_core::CompanyId;

use super::CliError;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Show the platform overview
    Dashboard,
    /// List companies
    Companies {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (1-100)
        #[arg(long, default_value_t = 20)]
        per_page: u32,

        /// Substring filter over company names
        #[arg(long)]
        search: Option<String>,

        /// Only active (true) or inactive (false) companies
        #[arg(long)]
        active: Option<bool>,
    },
    /// Show one company in detail
    Company {
        /// Company ID
        id: CompanyId,
    },
    /// List users across the platform
    Users {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (1-100)
        #[arg(long, default_value_t = 20)]
        per_page: u32,

        /// Substring filter over emails and usernames
        #[arg(long)]
        search: Option<String>,
    },
    /// Show platform statistics (last 30 days by default)
    Stats,
    /// Activate a company
    Activate {
        /// Company ID
        id: CompanyId,
    },
    /// Deactivate a company
    Deactivate {
        /// Company ID
        id: CompanyId,
    },
    /// Update a company's monthly generation limit
    SetLimit {
        /// Company ID
        id: CompanyId,

        /// New monthly limit (0-10000)
        limit: u32,
    },
}

pub async fn run(client: &EventaicClient, action: AdminAction) -> Result<(), CliError> {
    match action {
        AdminAction::Dashboard => {
            let dashboard = client.admin_dashboard().await?;
            info!(
                "Companies: {} ({} active)",
                dashboard.total_companies, dashboard.active_companies
            );
            info!("Users: {}", dashboard.total_users);
            info!(
                "Ads: {} total, {} today, {} this month",
                dashboard.total_ads_generated,
                dashboard.ads_generated_today,
                dashboard.ads_generated_this_month
            );
            info!(
                "Average evaluation score: {:.1}/10",
                dashboard.average_evaluation_score
            );
        }
        AdminAction::Companies {
            page,
            per_page,
            search,
            active,
        } => {
            let companies = client
                .admin_companies(&CompanyListQuery {
                    page,
                    per_page,
                    search,
                    is_active: active,
                })
                .await?;
            info!(
                "{} companies (page {} of {} total)",
                companies.companies.len(),
                companies.page,
                companies.total
            );
            for company in &companies.companies {
                let name = company.get("name").and_then(|v| v.as_str()).unwrap_or("?");
                let id = company.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                info!("  {id} {name}");
            }
        }
        AdminAction::Company { id } => {
            let company = client.admin_company_detail(id).await?;
            info!("Company: {} ({})", company.name, company.id);
            info!(
                "Active: {}, verified: {}",
                company.is_active, company.is_verified
            );
            info!(
                "Ads this month: {}/{}",
                company.ads_generated_this_month, company.monthly_ad_limit
            );
            info!("Users: {}", company.users.len());
        }
        AdminAction::Users {
            page,
            per_page,
            search,
        } => {
            let users = client
                .admin_users(&UserListQuery {
                    page,
                    per_page,
                    search,
                })
                .await?;
            info!(
                "{} users (page {} of {} total)",
                users.users.len(),
                users.page,
                users.total
            );
            for user in &users.users {
                info!("  {} <{}> [{}]", user.username, user.email, user.role);
            }
        }
        AdminAction::Stats => {
            let stats = client.admin_statistics(&StatisticsQuery::default()).await?;
            info!("Period: {} to {}", stats.period_start, stats.period_end);
            info!(
                "Ads: {}, regenerations: {}, evaluations: {}",
                stats.total_ads, stats.total_regenerations, stats.total_evaluations
            );
            info!(
                "Active: {} companies, {} users",
                stats.unique_companies, stats.active_users
            );
            for (platform, count) in &stats.platform_distribution {
                info!("  {platform}: {count}");
            }
        }
        AdminAction::Activate { id } => {
            let message = client.activate_company(id).await?;
            info!("{}", message.message);
        }
        AdminAction::Deactivate { id } => {
            let message = client.deactivate_company(id).await?;
            info!("{}", message.message);
        }
        AdminAction::SetLimit { id, limit } => {
            let message = client.update_company_limit(id, limit).await?;
            info!("{}", message.message);
        }
    }
    Ok(())
}
