//! Current user profile

use async_trait::async_trait;
use networking::{ApiClient, ApiError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::hook::{DataSource, Hook};

/// Endpoint serving the signed-in user
pub const PROFILE_PATH: &str = "/users/me";

/// Profile as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Prediction points
    #[serde(default)]
    pub points: u64,
    /// Leaderboard position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// Predictions made
    #[serde(default)]
    pub total_predictions: u32,
    /// Predictions won
    #[serde(default)]
    pub wins: u32,
}

/// Profile view model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Name to show; the username when none is set
    pub display_name: String,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Prediction points
    pub points: u64,
    /// Leaderboard position
    pub rank: Option<u32>,
    /// Predictions made
    pub total_predictions: u32,
    /// Predictions won
    pub wins: u32,
    /// Wins as a percentage of predictions made
    pub win_rate: f64,
}

impl UserProfile {
    /// Profile shown when the API cannot be reached
    pub fn guest() -> Self {
        Self {
            id: "guest".to_string(),
            username: "guest".to_string(),
            display_name: "Guest".to_string(),
            avatar_url: None,
            points: 0,
            rank: None,
            total_predictions: 0,
            wins: 0,
            win_rate: 0.0,
        }
    }
}

impl From<UserProfileDto> for UserProfile {
    fn from(dto: UserProfileDto) -> Self {
        let display_name = dto
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| dto.username.clone());

        Self {
            win_rate: win_rate(dto.wins, dto.total_predictions),
            id: dto.id,
            username: dto.username,
            display_name,
            avatar_url: dto.avatar_url,
            points: dto.points,
            rank: dto.rank,
            total_predictions: dto.total_predictions,
            wins: dto.wins,
        }
    }
}

/// Percentage rounded to one decimal; zero when nothing was predicted
pub fn win_rate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(wins) / f64::from(total) * 1000.0).round() / 10.0
}

/// Source for the signed-in user's profile
#[derive(Clone)]
pub struct ProfileSource {
    client: Arc<ApiClient>,
}

impl ProfileSource {
    /// Create a source using `client`
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ProfileSource {
    type Data = UserProfile;

    fn name(&self) -> &'static str {
        "profile"
    }

    async fn fetch(&self) -> Result<UserProfile, ApiError> {
        let dto: UserProfileDto = self.client.get_json(PROFILE_PATH).await?;
        Ok(dto.into())
    }

    fn fallback(&self) -> UserProfile {
        UserProfile::guest()
    }
}

/// Hook over [`ProfileSource`]
pub type ProfileHook = Hook<ProfileSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use app_platform::Platform;
    use networking::ApiConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dto() -> UserProfileDto {
        UserProfileDto {
            id: "u1".to_string(),
            username: "kopite".to_string(),
            display_name: None,
            avatar_url: None,
            points: 420,
            rank: Some(7),
            total_predictions: 3,
            wins: 2,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let profile = UserProfile::from(dto());
        assert_eq!(profile.display_name, "kopite");

        let profile = UserProfile::from(UserProfileDto {
            display_name: Some("  ".to_string()),
            ..dto()
        });
        assert_eq!(profile.display_name, "kopite");

        let profile = UserProfile::from(UserProfileDto {
            display_name: Some("The Kop".to_string()),
            ..dto()
        });
        assert_eq!(profile.display_name, "The Kop");
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(2, 3), 66.7);
        assert_eq!(win_rate(5, 5), 100.0);
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(UserProfile::from(dto()).win_rate, 66.7);
    }

    #[test]
    fn test_dto_field_names() {
        let dto: UserProfileDto = serde_json::from_value(serde_json::json!({
            "id": "u2",
            "username": "toffee",
            "displayName": "Toffee",
            "totalPredictions": 10,
            "wins": 4
        }))
        .unwrap();

        assert_eq!(dto.display_name.as_deref(), Some("Toffee"));
        assert_eq!(dto.points, 0);
        assert_eq!(dto.total_predictions, 10);
    }

    #[tokio::test]
    async fn test_profile_hook_fetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&dto()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(ApiConfig::new(mock_server.uri()), Platform::Web).unwrap();
        let hook = ProfileHook::new(ProfileSource::new(Arc::new(client)));
        assert_eq!(hook.state().data, UserProfile::guest());

        let state = hook.fetch().await;
        assert_eq!(state.error, None);
        assert_eq!(state.data.username, "kopite");
        assert_eq!(state.data.rank, Some(7));
    }

    #[tokio::test]
    async fn test_profile_hook_failure_uses_guest() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Unauthorized"})),
            )
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(ApiConfig::new(mock_server.uri()), Platform::Web).unwrap();
        let hook = ProfileHook::new(ProfileSource::new(Arc::new(client)));

        let state = hook.fetch().await;
        assert_eq!(state.data, UserProfile::guest());
        assert_eq!(state.error.as_deref(), Some("HTTP 401: Unauthorized"));
    }
}
