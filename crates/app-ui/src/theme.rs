//! Palettes and the theme provider
//!
//! # Usage
//!
//! ```rust
//! use app_state::ThemeMode;
//! use app_ui::theme::get_theme;
//!
//! let theme = get_theme(ThemeMode::Dark);
//! assert!(theme.is_dark());
//! let background = &theme.palette.background;
//! ```

use app_state::{ThemeError, ThemeManager, ThemeMode, ThemeState};
use serde::Serialize;
use std::sync::Arc;
use storage::PendingWrite;
use tokio::sync::watch;

/// A color represented as a hex string (e.g., "#FFFFFF")
pub type Color = &'static str;

/// Brand colors shared by both palettes
pub mod brand {
    /// Pitch green
    pub const PRIMARY: &str = "#16A34A";

    /// Trophy gold
    pub const ACCENT: &str = "#F59E0B";

    /// Live / loss red
    pub const DANGER: &str = "#EF4444";
}

/// Colors a screen renders with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Screen background
    pub background: Color,
    /// Cards and sheets
    pub surface: Color,
    /// Primary text
    pub text: Color,
    /// Secondary text
    pub text_muted: Color,
    /// Dividers and outlines
    pub border: Color,
    /// Buttons, links, selected tabs
    pub primary: Color,
    /// Highlights such as favorites
    pub accent: Color,
    /// Errors and losses
    pub danger: Color,
}

/// Complete theme for one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Mode this theme renders
    pub mode: ThemeMode,
    /// Colors
    pub palette: Palette,
}

impl Theme {
    /// Check if this is a dark theme
    pub fn is_dark(&self) -> bool {
        self.mode.is_dark()
    }
}

/// Create the light theme
pub fn light_theme() -> Theme {
    Theme {
        mode: ThemeMode::Light,
        palette: Palette {
            background: "#F8FAFC",
            surface: "#FFFFFF",
            text: "#0F172A",
            text_muted: "#64748B",
            border: "#E2E8F0",
            primary: brand::PRIMARY,
            accent: brand::ACCENT,
            danger: brand::DANGER,
        },
    }
}

/// Create the dark theme
pub fn dark_theme() -> Theme {
    Theme {
        mode: ThemeMode::Dark,
        palette: Palette {
            background: "#0B1120",
            surface: "#1E293B",
            text: "#F1F5F9",
            text_muted: "#94A3B8",
            border: "#334155",
            primary: brand::PRIMARY,
            accent: brand::ACCENT,
            danger: brand::DANGER,
        },
    }
}

/// Get the theme for a mode
pub fn get_theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Light => light_theme(),
        ThemeMode::Dark => dark_theme(),
    }
}

/// Hands the active theme to screens
///
/// Yields nothing while the persisted mode is loading so the wrong palette
/// is never shown.
#[derive(Clone)]
pub struct ThemeProvider {
    manager: Arc<ThemeManager>,
}

impl ThemeProvider {
    /// Wrap a theme manager
    pub fn new(manager: Arc<ThemeManager>) -> Self {
        Self { manager }
    }

    /// Active theme, or `None` while loading
    pub fn current(&self) -> Option<Theme> {
        self.manager.mode().map(get_theme)
    }

    /// Wait until the mode is loaded
    pub async fn ready(&self) -> Option<Theme> {
        let mut rx = self.manager.subscribe();
        let state = rx.wait_for(|state| matches!(state, ThemeState::Ready(_))).await.ok()?;
        state.mode().map(get_theme)
    }

    /// Switch between light and dark
    pub fn toggle(&self) -> Result<PendingWrite, ThemeError> {
        self.manager.toggle_theme()
    }

    /// Switch to `mode`
    pub fn set_mode(&self, mode: ThemeMode) -> Result<PendingWrite, ThemeError> {
        self.manager.set_theme_mode(mode)
    }

    /// Receive every theme state change
    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.manager.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_platform::{ColorScheme, Platform, StaticEnvironment};
    use storage::{keys, KeyValueStore, MemoryStore};

    fn manager(entries: Vec<(&str, &str)>, scheme: Option<ColorScheme>) -> Arc<ThemeManager> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_entries(entries));
        let environment = Arc::new(StaticEnvironment::new(Platform::Ios, scheme));
        Arc::new(ThemeManager::new(store, environment))
    }

    #[test]
    fn test_themes() {
        let light = get_theme(ThemeMode::Light);
        let dark = get_theme(ThemeMode::Dark);

        assert!(!light.is_dark());
        assert!(dark.is_dark());
        assert_eq!(light.palette.primary, dark.palette.primary);
        assert_eq!(light.palette.background, "#F8FAFC");
        assert_eq!(dark.palette.background, "#0B1120");
        assert_ne!(light.palette.text, dark.palette.text);
    }

    #[tokio::test]
    async fn test_provider_hides_theme_while_loading() {
        let manager = manager(vec![], Some(ColorScheme::Light));
        let provider = ThemeProvider::new(manager.clone());
        assert_eq!(provider.current(), None);
        assert_eq!(provider.toggle().unwrap_err(), ThemeError::NotReady);

        manager.init().await;
        assert_eq!(provider.current(), Some(light_theme()));
    }

    #[tokio::test]
    async fn test_provider_ready_waits_for_load() {
        let manager = manager(vec![(keys::THEME, "light")], Some(ColorScheme::Dark));
        let provider = ThemeProvider::new(manager.clone());

        let waiter = tokio::spawn({
            let provider = provider.clone();
            async move { provider.ready().await }
        });
        manager.init().await;

        assert_eq!(waiter.await.unwrap(), Some(light_theme()));
    }

    #[tokio::test]
    async fn test_provider_toggle() {
        let manager = manager(vec![], None);
        manager.init().await;
        let provider = ThemeProvider::new(manager);
        let mut rx = provider.subscribe();
        assert_eq!(provider.current(), Some(dark_theme()));

        provider.toggle().unwrap().wait().await.unwrap();
        assert_eq!(provider.current(), Some(light_theme()));
        assert!(rx.has_changed().unwrap());

        provider.set_mode(ThemeMode::Dark).unwrap().wait().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ThemeState::Ready(ThemeMode::Dark));
    }
}
