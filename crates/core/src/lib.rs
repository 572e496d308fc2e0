//! Eventaic Core - Shared types library.
//!
//! This crate provides common types used across all Eventaic SDK components:
//! - `client` - Authenticated HTTP client for the Eventaic API
//! - `cli` - Command-line consumer of the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP, no storage. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, domain enums, and the
//!   session user summary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
