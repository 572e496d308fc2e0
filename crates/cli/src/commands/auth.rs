//! Session commands: login, registration, logout, identity.

use clap::Subcommand;
use secrecy::SecretString;
use tracing::info;

use eventaic_client::EventaicClient;
use eventaic_client::auth::RegisterRequest;

use super::CliError;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in with a username or email
    Login {
        /// Username or email address
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Register a new account
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Login name
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(long)]
        full_name: Option<String>,

        /// Company to create alongside the account
        #[arg(long)]
        company: Option<String>,

        /// Contact phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the authenticated user
    Whoami,
}

pub async fn run(client: &EventaicClient, action: AuthAction) -> Result<(), CliError> {
    match action {
        AuthAction::Login { username, password } => {
            let grant = client.login(&username, &SecretString::from(password)).await?;
            match grant.user {
                Some(user) => info!("Logged in as {} ({})", user.display_name(), user.email),
                None => info!("Logged in"),
            }
        }
        AuthAction::Register {
            email,
            username,
            password,
            full_name,
            company,
            phone,
        } => {
            let grant = client
                .register(&RegisterRequest {
                    email,
                    username,
                    password: SecretString::from(password),
                    full_name,
                    company_name: company,
                    phone,
                })
                .await?;
            match grant.user {
                Some(user) => info!("Registered and logged in as {}", user.email),
                None => info!("Registered"),
            }
        }
        AuthAction::Logout => {
            client.logout().await;
            info!("Logged out");
        }
        AuthAction::Whoami => {
            if !client.session().is_authenticated() {
                return Err(CliError::NotLoggedIn);
            }
            let profile = client.me().await?;
            info!("User: {} <{}>", profile.username, profile.email);
            info!("Role: {}", profile.role);
            if let Some(company) = profile.company_name {
                info!("Company: {company}");
            }
            if let Some(last_login) = profile.last_login {
                info!("Last login: {last_login}");
            }
        }
    }
    Ok(())
}
