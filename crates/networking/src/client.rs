//! HTTP client
//!
//! Thin JSON-over-HTTP client. One request per call: no retry, no backoff,
//! no caching. Non-2xx responses and undecodable bodies become [`ApiError`].

use app_platform::Platform;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ApiConfig;

/// API errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the raw body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether the failure happened before any response arrived
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error body shape the API uses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// JSON API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    base_url: String,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a client for `platform`
    pub fn new(config: ApiConfig, platform: Platform) -> Result<Self, ApiError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config.resolve_base_url(platform);
        tracing::debug!(%base_url, %platform, "api client ready");

        Ok(Self { client, base_url, config })
    }

    /// Base URL requests are sent to (prefix included)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut req = self.client.get(&url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        let response = req.send().await.map_err(|e| {
            tracing::debug!(%url, "request failed: {}", e);
            ApiError::Network(format!("Request failed: {}", e))
        })?;

        Self::parse_response(response).await
    }

    async fn parse_response<T>(response: ReqwestResponse) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody { message: Some(message), .. }) => message,
                Ok(ErrorBody { error: Some(error), .. }) => error,
                _ if body.is_empty() => status.canonical_reason().unwrap_or("Unknown").to_string(),
                _ => body,
            };
            return Err(ApiError::Status { status: status.as_u16(), message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_urls() {
        let client = ApiClient::new(ApiConfig::new("https://api.example.com"), Platform::Web).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/api");
        assert_eq!(client.url("/users/me"), "https://api.example.com/api/users/me");
        assert_eq!(client.url("admin/stats"), "https://api.example.com/api/admin/stats");
    }

    #[test]
    fn test_native_client_url() {
        let config = ApiConfig::default().with_host("192.168.1.20", 8080);
        let client = ApiClient::new(config, Platform::Ios).unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.20:8080/api");
    }

    #[test]
    fn test_error_helpers() {
        let err = ApiError::Status { status: 503, message: "down".to_string() };
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_network_error());
        assert_eq!(err.to_string(), "HTTP 503: down");

        let err = ApiError::Network("refused".to_string());
        assert!(err.is_network_error());
        assert_eq!(err.status(), None);
    }
}
