//! Matchday client state layer
//!
//! Ties the workspace together: configuration, logging setup and the
//! [`AppContext`] that owns the theme, favorites, search history and data
//! hooks.
//!
//! # Example
//!
//! ```rust,no_run
//! use matchday::{AppConfig, AppContext};
//!
//! # async fn run() -> anyhow::Result<()> {
//! matchday::init_tracing("matchday=info");
//! let context = AppContext::bootstrap(AppConfig::from_env()?).await?;
//! context.history().add_to_history("Arsenal");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;

pub use config::{AppConfig, ConfigError};
pub use context::AppContext;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_directive`. Calling this more
/// than once is harmless.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
