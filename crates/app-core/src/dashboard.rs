//! Admin dashboard aggregates
//!
//! The dashboard is assembled from three endpoints requested concurrently.
//! It is all or nothing: if any request fails the whole dashboard falls back
//! to the built-in figures.

use async_trait::async_trait;
use networking::{ApiClient, ApiError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::hook::{DataSource, Hook};

/// Headline figures endpoint
pub const STATS_PATH: &str = "/admin/stats";

/// Recent activity endpoint
pub const ACTIVITY_PATH: &str = "/admin/activity";

/// Leaderboard endpoint
pub const TOP_USERS_PATH: &str = "/admin/top-users";

/// Headline figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Registered users
    #[serde(default)]
    pub total_users: u64,
    /// Users active in the last day
    #[serde(default)]
    pub active_users: u64,
    /// Bets placed
    #[serde(default)]
    pub total_bets: u64,
    /// Matches still to be settled
    #[serde(default)]
    pub pending_matches: u64,
}

/// One line of the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Entry ID
    pub id: String,
    /// Who did it
    pub user: String,
    /// What happened
    pub action: String,
    /// When, as sent by the server
    pub timestamp: String,
}

/// Leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Prediction points
    #[serde(default)]
    pub points: u64,
    /// Predictions won
    #[serde(default)]
    pub wins: u32,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    /// Headline figures
    pub stats: AdminStats,
    /// Recent activity, newest first
    pub activity: Vec<ActivityEntry>,
    /// Leaderboard
    pub top_users: Vec<TopUser>,
}

impl DashboardData {
    /// Built-in figures used when the API is unavailable
    pub fn fallback() -> Self {
        let activity = [
            ("a1", "kopite", "placed a bet on LIV vs MCI", "2 min ago"),
            ("a2", "gooner88", "joined the Premier League group", "15 min ago"),
            ("a3", "toffee", "won a prediction", "1 hour ago"),
        ]
        .into_iter()
        .map(|(id, user, action, timestamp)| ActivityEntry {
            id: id.to_string(),
            user: user.to_string(),
            action: action.to_string(),
            timestamp: timestamp.to_string(),
        })
        .collect();

        let top_users = [("u1", "kopite", 2450, 38), ("u2", "gooner88", 2310, 35), ("u3", "toffee", 1980, 29)]
            .into_iter()
            .map(|(id, username, points, wins)| TopUser {
                id: id.to_string(),
                username: username.to_string(),
                points,
                wins,
            })
            .collect();

        Self {
            stats: AdminStats {
                total_users: 1250,
                active_users: 342,
                total_bets: 8940,
                pending_matches: 12,
            },
            activity,
            top_users,
        }
    }
}

/// Source for [`DashboardData`]
#[derive(Clone)]
pub struct DashboardSource {
    client: Arc<ApiClient>,
}

impl DashboardSource {
    /// Create a source using `client`
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for DashboardSource {
    type Data = DashboardData;

    fn name(&self) -> &'static str {
        "dashboard"
    }

    async fn fetch(&self) -> Result<DashboardData, ApiError> {
        let (stats, activity, top_users) = tokio::try_join!(
            self.client.get_json::<AdminStats>(STATS_PATH),
            self.client.get_json::<Vec<ActivityEntry>>(ACTIVITY_PATH),
            self.client.get_json::<Vec<TopUser>>(TOP_USERS_PATH),
        )?;

        Ok(DashboardData { stats, activity, top_users })
    }

    fn fallback(&self) -> DashboardData {
        DashboardData::fallback()
    }
}

/// Hook over [`DashboardSource`]
pub type DashboardHook = Hook<DashboardSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use app_platform::Platform;
    use networking::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/api{}", route)))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn hook_for(server: &MockServer) -> DashboardHook {
        let client = ApiClient::new(ApiConfig::new(server.uri()), Platform::Web).unwrap();
        DashboardHook::new(DashboardSource::new(Arc::new(client)))
    }

    #[test]
    fn test_fallback_is_populated() {
        let data = DashboardData::fallback();
        assert_eq!(data.stats.total_users, 1250);
        assert_eq!(data.activity.len(), 3);
        assert_eq!(data.top_users[0].username, "kopite");
    }

    #[tokio::test]
    async fn test_dashboard_fetch() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            STATS_PATH,
            ResponseTemplate::new(200).set_body_json(json!({
                "totalUsers": 10,
                "activeUsers": 4,
                "totalBets": 31,
                "pendingMatches": 2
            })),
        )
        .await;
        mount(
            &mock_server,
            ACTIVITY_PATH,
            ResponseTemplate::new(200).set_body_json(json!([
                {"id": "x", "user": "ref", "action": "settled a match", "timestamp": "now"}
            ])),
        )
        .await;
        mount(&mock_server, TOP_USERS_PATH, ResponseTemplate::new(200).set_body_json(json!([]))).await;

        let hook = hook_for(&mock_server);
        let state = hook.fetch().await;

        assert_eq!(state.error, None);
        assert_eq!(state.data.stats.total_bets, 31);
        assert_eq!(state.data.activity[0].action, "settled a match");
        assert!(state.data.top_users.is_empty());
    }

    #[tokio::test]
    async fn test_any_failure_falls_back() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, STATS_PATH, ResponseTemplate::new(200).set_body_json(json!({}))).await;
        mount(&mock_server, ACTIVITY_PATH, ResponseTemplate::new(200).set_body_json(json!([]))).await;
        mount(
            &mock_server,
            TOP_USERS_PATH,
            ResponseTemplate::new(500).set_body_json(json!({"error": "leaderboard offline"})),
        )
        .await;

        let hook = hook_for(&mock_server);
        let state = hook.fetch().await;

        assert_eq!(state.data, DashboardData::fallback());
        assert_eq!(state.error.as_deref(), Some("HTTP 500: leaderboard offline"));
    }
}
