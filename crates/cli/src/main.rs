//! Eventaic CLI - drive the ad-generation platform from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session persists across invocations)
//! eventaic auth login -u a@b.com -p 'secret'
//!
//! # Generate an ad for an event
//! eventaic ads generate --event "Black Friday" --category electronics
//!
//! # Inspect the company dashboard
//! eventaic company dashboard
//!
//! # Platform administration (super-admin accounts)
//! eventaic admin companies --search initech
//! ```
//!
//! # Environment Variables
//!
//! - `EVENTAIC_API_URL` - Base URL of the Eventaic backend (required)
//! - `EVENTAIC_SESSION_FILE` - Session file path (default:
//!   `<config-dir>/eventaic/session.json`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use eventaic_client::{ClientConfig, EventaicClient, FileStore, SessionManager};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "eventaic")]
#[command(author, version, about = "Eventaic ad-generation platform CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the authenticated session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Generate, evaluate, and manage ads
    Ads {
        #[command(subcommand)]
        action: commands::ads::AdsAction,
    },
    /// Company dashboard, usage, and profile
    Company {
        #[command(subcommand)]
        action: commands::company::CompanyAction,
    },
    /// Platform administration (super-admin accounts)
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = build_client()?;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&client, action).await,
        Commands::Ads { action } => commands::ads::run(&client, action).await,
        Commands::Company { action } => commands::company::run(&client, action).await,
        Commands::Admin { action } => commands::admin::run(&client, action).await,
    }
}

/// Build a client over the file-backed session store so credentials survive
/// between invocations.
fn build_client() -> Result<EventaicClient, CliError> {
    let config = ClientConfig::from_env()?;
    let session = SessionManager::new(FileStore::open(session_path()));
    Ok(EventaicClient::new(config, session))
}

/// Session file location: `EVENTAIC_SESSION_FILE`, the platform config
/// directory, or the working directory as a last resort.
fn session_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("EVENTAIC_SESSION_FILE") {
        return path.into();
    }
    dirs::config_dir().map_or_else(
        || ".eventaic-session.json".into(),
        |dir| dir.join("eventaic").join("session.json"),
    )
}
