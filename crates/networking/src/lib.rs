//! Networking for Matchday
//!
//! This crate provides the HTTP client the data hooks call, together with
//! the configuration that resolves the API base URL for the running
//! platform.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;

pub use client::{ApiClient, ApiError};
pub use config::ApiConfig;
