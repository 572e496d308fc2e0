//! CLI command implementations, one module per subcommand group.

pub mod admin;
pub mod ads;
pub mod auth;
pub mod company;

use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Client configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] eventaic_client::ConfigError),

    /// An API call failed.
    #[error("{0}")]
    Api(#[from] eventaic_client::ApiError),

    /// The command needs an authenticated session and none is stored.
    #[error("not logged in (run `eventaic auth login` first)")]
    NotLoggedIn,
}
