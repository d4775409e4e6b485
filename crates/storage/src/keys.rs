//! Storage keys
//!
//! Each key is owned by exactly one store.

/// Theme mode (`"light"` or `"dark"`)
pub const THEME: &str = "@app_theme";

/// Favorite matches
pub const FAV_MATCHES: &str = "fav_matches";

/// Favorite players
pub const FAV_PLAYERS: &str = "fav_players";

/// Favorite teams
pub const FAV_TEAMS: &str = "fav_teams";

/// Favorite competitions
pub const FAV_COMPETITIONS: &str = "fav_competitions";

/// Recent search terms
pub const SEARCH_HISTORY: &str = "@search_history";

/// Every key the application writes
pub const ALL: [&str; 6] = [
    THEME,
    FAV_MATCHES,
    FAV_PLAYERS,
    FAV_TEAMS,
    FAV_COMPETITIONS,
    SEARCH_HISTORY,
];
