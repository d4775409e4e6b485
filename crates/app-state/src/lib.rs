//! Application state management for Matchday
//!
//! This crate holds the client's locally persisted state: the display
//! theme, the four favorites collections and the recent-search list. Each
//! store owns its in-memory cache and its storage key(s) and is the only
//! writer of them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod favorites;
pub mod search_history;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_support;

pub use favorites::{
    Category, CompetitionInfo, Favorite, FavoriteItem, FavoriteKind, FavoritesError,
    FavoritesStore, ItemId, MatchInfo, PlayerInfo, TeamInfo,
};
pub use search_history::{HistoryError, SearchHistoryStore, MAX_HISTORY};
pub use theme::{ThemeError, ThemeManager, ThemeMode, ThemeState};
