//! # Post Feed Library
//!
//! Fetches a fixed account's submitted posts from a token-protected, cursor-paginated
//! provider API and serves them as JSON.
//!
//! Modules:
//! - `cache` — bearer credential and its lazily refreshed cache
//! - `sources` — provider client: credential exchange, listing pages, pagination walk
//! - `parser` — listing envelope parsing and post normalization
//! - `feed` — the fetch pipeline behind every request
//! - `server` — axum routes
//! - `config` — YAML service configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::provider::ServiceConfig;
pub use crate::error::{ConfigError, FetchError};
pub use crate::feed::{Feed, PostFeed};
pub use crate::parser::normalize::{normalize, NormalizedPost};
