//! Application configuration

use app_platform::{
    ColorScheme, Environment, Platform, PlatformError, StaticEnvironment, SystemEnvironment,
    COLOR_SCHEME_ENV, PLATFORM_ENV,
};
use networking::{ApiConfig, ApiError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable naming the storage directory
pub const STORAGE_DIR_ENV: &str = "MATCHDAY_STORAGE_DIR";

/// Storage directory used when none is configured
pub const DEFAULT_STORAGE_DIR: &str = "./matchday-data";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Platform or color scheme override could not be parsed
    #[error("Invalid environment override: {0}")]
    Platform(#[from] PlatformError),

    /// API settings could not be read
    #[error("Invalid API configuration: {0}")]
    Api(#[from] ApiError),
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding both storage backends
    pub storage_dir: PathBuf,
    /// Platform override; the host is asked when unset
    pub platform: Option<Platform>,
    /// Color scheme override; the host is asked when unset
    pub color_scheme: Option<ColorScheme>,
    /// Remote API settings
    pub api: ApiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            platform: None,
            color_scheme: None,
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create a configuration storing data under `storage_dir`
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self { storage_dir: storage_dir.into(), ..Default::default() }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self { api: ApiConfig::from_env()?, ..Default::default() };

        if let Some(dir) = non_empty_var(STORAGE_DIR_ENV) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(platform) = non_empty_var(PLATFORM_ENV) {
            config.platform = Some(platform.parse()?);
        }
        if let Some(scheme) = non_empty_var(COLOR_SCHEME_ENV) {
            config.color_scheme = Some(scheme.parse()?);
        }

        Ok(config)
    }

    /// Force the platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Force the color scheme preference
    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = Some(scheme);
        self
    }

    /// Set the API configuration
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// Storage directory
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Path of the sled database used on native targets
    pub fn native_store_path(&self) -> PathBuf {
        self.storage_dir.join("native.db")
    }

    /// Path of the JSON file used on web targets
    pub fn web_store_path(&self) -> PathBuf {
        self.storage_dir.join("local_storage.json")
    }

    /// Environment honoring the configured overrides
    ///
    /// Without overrides the host is queried on every call; with any override
    /// the remaining value is sampled from the host once.
    pub fn environment(&self) -> Arc<dyn Environment> {
        if self.platform.is_none() && self.color_scheme.is_none() {
            return Arc::new(SystemEnvironment);
        }

        let system = SystemEnvironment;
        Arc::new(StaticEnvironment::new(
            self.platform.unwrap_or_else(|| system.platform()),
            self.color_scheme.or_else(|| system.color_scheme()),
        ))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
