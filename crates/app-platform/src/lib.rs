//! Platform detection for Matchday
//!
//! This crate answers the two questions the state layer asks its host:
//! which runtime platform the app is running on (web or native), and
//! which color scheme the operating system prefers.

#![warn(missing_docs)]
#![warn(clippy::all)]

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Platform errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// Unrecognized platform name
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// Unrecognized color scheme name
    #[error("Unknown color scheme: {0}")]
    UnknownColorScheme(String),
}

/// Runtime platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser build
    Web,
    /// iOS device
    Ios,
    /// Android device
    Android,
}

impl Platform {
    /// Platform this binary was compiled for
    ///
    /// Only wasm and iOS builds are told apart; every other target,
    /// desktop hosts included, reports [`Platform::Android`].
    pub fn compiled() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Android
        }
    }

    /// Whether this is a web target
    pub fn is_web(&self) -> bool {
        matches!(self, Platform::Web)
    }

    /// Whether this is a native (mobile) target
    pub fn is_native(&self) -> bool {
        !self.is_web()
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(PlatformError::UnknownPlatform(other.to_string())),
        }
    }
}

/// System color scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light appearance
    Light,
    /// Dark appearance
    Dark,
}

impl FromStr for ColorScheme {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            other => Err(PlatformError::UnknownColorScheme(other.to_string())),
        }
    }
}

/// Read-only view of the host environment
///
/// Both values are sampled by the caller whenever it needs them; nothing
/// here pushes change notifications.
pub trait Environment: Send + Sync {
    /// Current runtime platform
    fn platform(&self) -> Platform;

    /// System color scheme preference, if the host exposes one
    fn color_scheme(&self) -> Option<ColorScheme>;
}

/// Environment backed by fixed values that can be changed at runtime
///
/// Used by the application bootstrap when the values come from configuration,
/// and by tests that need to flip the platform between calls.
#[derive(Debug)]
pub struct StaticEnvironment {
    platform: RwLock<Platform>,
    color_scheme: RwLock<Option<ColorScheme>>,
}

impl StaticEnvironment {
    /// Create an environment with the given values
    pub fn new(platform: Platform, color_scheme: Option<ColorScheme>) -> Self {
        Self {
            platform: RwLock::new(platform),
            color_scheme: RwLock::new(color_scheme),
        }
    }

    /// Change the reported platform
    pub fn set_platform(&self, platform: Platform) {
        *self.platform.write() = platform;
    }

    /// Change the reported color scheme
    pub fn set_color_scheme(&self, scheme: Option<ColorScheme>) {
        *self.color_scheme.write() = scheme;
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new(Platform::compiled(), None)
    }
}

impl Environment for StaticEnvironment {
    fn platform(&self) -> Platform {
        *self.platform.read()
    }

    fn color_scheme(&self) -> Option<ColorScheme> {
        *self.color_scheme.read()
    }
}

/// Environment variable naming the platform override
pub const PLATFORM_ENV: &str = "MATCHDAY_PLATFORM";

/// Environment variable naming the color scheme preference
pub const COLOR_SCHEME_ENV: &str = "MATCHDAY_COLOR_SCHEME";

/// Environment read from process environment variables on every call
///
/// Falls back to the compiled platform and no color preference when the
/// variables are missing or unparseable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn platform(&self) -> Platform {
        std::env::var(PLATFORM_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(Platform::compiled)
    }

    fn color_scheme(&self) -> Option<ColorScheme> {
        std::env::var(COLOR_SCHEME_ENV).ok().and_then(|v| v.parse().ok())
    }
}
