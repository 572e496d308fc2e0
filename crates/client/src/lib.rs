//! Eventaic API client.
//!
//! Wraps outbound HTTP calls to the Eventaic backend, attaches bearer
//! credentials from a persisted session, and transparently recovers from an
//! expired access token by exchanging the refresh token and replaying the
//! failed call exactly once.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eventaic_client::{ClientConfig, EventaicClient, SessionManager};
//!
//! let config = ClientConfig::new("https://api.eventaic.com")?;
//! let client = EventaicClient::new(config, SessionManager::in_memory());
//!
//! client.login("a@b.com", &"secret".into()).await?;
//! let ads = client.list_ads(&Default::default()).await?;
//! ```
//!
//! # Modules
//!
//! - [`session`] - Session credentials, injectable storage, change events
//! - [`auth`] - Login, registration, token grants, password management
//! - [`ads`] - Ad generation, regeneration, evaluation, and CRUD
//! - [`company`] - Company dashboard, usage, and profile
//! - [`users`] - User profile and activity
//! - [`admin`] - Platform-wide admin surface (super-admin only)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod ads;
pub mod auth;
pub mod company;
mod config;
mod error;
mod http;
pub mod session;
pub mod users;

pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{ApiMessage, EventaicClient, RequestOptions};
pub use session::{FileStore, MemoryStore, SessionEvent, SessionManager, SessionStore};
