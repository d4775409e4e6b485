//! API client configuration
//!
//! Web builds talk to a directly configured base URL; native builds compose
//! the URL from a host and port. Either way the fixed path prefix follows.

use app_platform::Platform;
use std::collections::HashMap;
use std::time::Duration;

use crate::client::ApiError;

/// Environment variable holding the direct base URL (web)
pub const API_URL_ENV: &str = "MATCHDAY_API_URL";

/// Environment variable holding the API host (native)
pub const API_HOST_ENV: &str = "MATCHDAY_API_HOST";

/// Environment variable holding the API port (native)
pub const API_PORT_ENV: &str = "MATCHDAY_API_PORT";

/// Path prefix every endpoint lives under
pub const PATH_PREFIX: &str = "/api";

/// Configuration for [`crate::ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Direct base URL, used on web
    pub base_url: Option<String>,
    /// Host, used on native
    pub host: String,
    /// Port, used on native
    pub port: u16,
    /// Path prefix appended to the base URL
    pub path_prefix: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: "localhost".to_string(),
            port: 3000,
            path_prefix: PATH_PREFIX.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Matchday/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl ApiConfig {
    /// Create a config with a direct base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: Some(base_url.into()), ..Default::default() }
    }

    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = Some(url.trim().to_string());
            }
        }
        if let Ok(host) = std::env::var(API_HOST_ENV) {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }
        if let Ok(port) = std::env::var(API_PORT_ENV) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{} is not a valid port: {}", API_PORT_ENV, port)))?;
        }

        Ok(config)
    }

    /// Set the host and port
    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the path prefix
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Base URL including the path prefix for `platform`
    ///
    /// Web without a configured base URL falls back to host and port.
    pub fn resolve_base_url(&self, platform: Platform) -> String {
        let origin = match (&self.base_url, platform.is_web()) {
            (Some(url), true) => url.clone(),
            _ => format!("http://{}:{}", self.host, self.port),
        };

        let prefix = self.path_prefix.trim_matches('/');
        if prefix.is_empty() {
            origin.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", origin.trim_end_matches('/'), prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, None);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3000);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("Matchday/"));
    }

    #[test]
    fn test_web_uses_direct_base_url() {
        let config = ApiConfig::new("https://api.matchday.example/");
        assert_eq!(
            config.resolve_base_url(Platform::Web),
            "https://api.matchday.example/api"
        );
    }

    #[test]
    fn test_native_composes_host_and_port() {
        let config = ApiConfig::new("https://api.matchday.example").with_host("10.0.2.2", 4000);
        assert_eq!(config.resolve_base_url(Platform::Android), "http://10.0.2.2:4000/api");
        assert_eq!(config.resolve_base_url(Platform::Ios), "http://10.0.2.2:4000/api");
    }

    #[test]
    fn test_web_without_base_url_falls_back() {
        let config = ApiConfig::default();
        assert_eq!(config.resolve_base_url(Platform::Web), "http://localhost:3000/api");
    }

    #[test]
    fn test_empty_prefix() {
        let config = ApiConfig::new("http://127.0.0.1:9000").with_path_prefix("/");
        assert_eq!(config.resolve_base_url(Platform::Web), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_builder() {
        let config = ApiConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("Test/1.0")
            .with_header("X-Client", "matchday");

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "Test/1.0");
        assert_eq!(config.default_headers.get("X-Client"), Some(&"matchday".to_string()));
    }
}
