//! Theme state management
//!
//! The manager starts in [`ThemeState::Loading`] and moves to
//! [`ThemeState::Ready`] once the persisted mode has been read. Setters
//! update memory and notify subscribers synchronously, then queue the
//! write; a failed write is logged and never rolled back.

use app_platform::{ColorScheme, Environment};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use storage::{keys, KeyValueStore, PendingWrite, WriteQueue};
use thiserror::Error;
use tokio::sync::watch;

/// Theme errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    /// The persisted mode has not been loaded yet
    #[error("Theme is still loading")]
    NotReady,

    /// Unrecognized mode string
    #[error("Unknown theme mode: {0}")]
    UnknownMode(String),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;

/// Display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light palette
    Light,
    /// Dark palette
    #[default]
    Dark,
}

impl ThemeMode {
    /// Persisted representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Whether this is the dark mode
    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl From<ColorScheme> for ThemeMode {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => ThemeMode::Light,
            ColorScheme::Dark => ThemeMode::Dark,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(ThemeError::UnknownMode(other.to_string())),
        }
    }
}

/// Lifecycle of the theme value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeState {
    /// Persisted mode not read yet; render nothing
    Loading,
    /// Active mode
    Ready(ThemeMode),
}

impl ThemeState {
    /// Active mode, if loaded
    pub fn mode(&self) -> Option<ThemeMode> {
        match self {
            ThemeState::Loading => None,
            ThemeState::Ready(mode) => Some(*mode),
        }
    }
}

/// Owner of the active theme mode
pub struct ThemeManager {
    store: Arc<dyn KeyValueStore>,
    environment: Arc<dyn Environment>,
    queue: WriteQueue,
    state: watch::Sender<ThemeState>,
}

impl ThemeManager {
    /// Create a manager in the loading state
    ///
    /// Must be called within a Tokio runtime (the write queue spawns its worker).
    pub fn new(store: Arc<dyn KeyValueStore>, environment: Arc<dyn Environment>) -> Self {
        let queue = WriteQueue::new(store.clone(), keys::THEME);
        let (state, _) = watch::channel(ThemeState::Loading);
        Self { store, environment, queue, state }
    }

    /// Create a manager and load the persisted mode
    pub async fn load(store: Arc<dyn KeyValueStore>, environment: Arc<dyn Environment>) -> Self {
        let manager = Self::new(store, environment);
        manager.init().await;
        manager
    }

    /// Read the persisted mode and become ready
    ///
    /// Only the first call reads storage; later calls return the current mode.
    pub async fn init(&self) -> ThemeMode {
        if let Some(mode) = self.mode() {
            return mode;
        }

        let loaded = match self.store.get(keys::THEME).await {
            Ok(Some(raw)) => match raw.parse::<ThemeMode>() {
                Ok(mode) => mode,
                Err(e) => {
                    tracing::warn!("ignoring persisted theme: {}", e);
                    self.system_mode()
                }
            },
            Ok(None) => self.system_mode(),
            Err(e) => {
                tracing::error!("failed to load theme, defaulting to dark: {}", e);
                ThemeMode::Dark
            }
        };

        let mut active = loaded;
        self.state.send_if_modified(|state| match state {
            ThemeState::Loading => {
                *state = ThemeState::Ready(loaded);
                true
            }
            // A concurrent init finished first
            ThemeState::Ready(mode) => {
                active = *mode;
                false
            }
        });

        tracing::debug!(mode = %active, "theme ready");
        active
    }

    /// System preference sampled now, dark when the host has none
    fn system_mode(&self) -> ThemeMode {
        self.environment.color_scheme().map(ThemeMode::from).unwrap_or_default()
    }

    /// Current state snapshot
    pub fn state(&self) -> ThemeState {
        *self.state.borrow()
    }

    /// Active mode, `None` while loading
    pub fn mode(&self) -> Option<ThemeMode> {
        self.state().mode()
    }

    /// Whether the persisted mode has been loaded
    pub fn is_ready(&self) -> bool {
        self.mode().is_some()
    }

    /// Receive every state transition
    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state.subscribe()
    }

    /// Flip between light and dark
    pub fn toggle_theme(&self) -> Result<PendingWrite> {
        self.update(|mode| mode.toggled())
    }

    /// Switch to an explicit mode
    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<PendingWrite> {
        self.update(|_| mode)
    }

    fn update<F>(&self, next: F) -> Result<PendingWrite>
    where
        F: FnOnce(ThemeMode) -> ThemeMode,
    {
        let mut pending = None;
        self.state.send_if_modified(|state| match state {
            ThemeState::Loading => false,
            ThemeState::Ready(current) => {
                let target = next(*current);
                // Enqueue under the state lock so writes follow state order
                pending = Some(self.queue.enqueue(target.as_str()));
                let changed = *current != target;
                *current = target;
                changed
            }
        });
        pending.ok_or(ThemeError::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FlakyStore;
    use app_platform::{Platform, StaticEnvironment};

    fn env(scheme: Option<ColorScheme>) -> Arc<StaticEnvironment> {
        Arc::new(StaticEnvironment::new(Platform::Ios, scheme))
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("light".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert_eq!("dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert_eq!(
            "dim".parse::<ThemeMode>(),
            Err(ThemeError::UnknownMode("dim".to_string()))
        );
        assert_eq!(ThemeMode::Light.to_string(), "light");
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::default(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let manager = ThemeManager::new(Arc::new(FlakyStore::new()), env(None));
        assert_eq!(manager.state(), ThemeState::Loading);
        assert!(!manager.is_ready());
        assert_eq!(manager.toggle_theme().unwrap_err(), ThemeError::NotReady);
        assert_eq!(manager.set_theme_mode(ThemeMode::Light).unwrap_err(), ThemeError::NotReady);
    }

    #[tokio::test]
    async fn test_no_persisted_value_uses_system_preference() {
        let store = Arc::new(FlakyStore::new());
        let manager = ThemeManager::load(store, env(Some(ColorScheme::Light))).await;
        assert_eq!(manager.state(), ThemeState::Ready(ThemeMode::Light));
    }

    #[tokio::test]
    async fn test_no_persisted_value_no_preference_is_dark() {
        let manager = ThemeManager::load(Arc::new(FlakyStore::new()), env(None)).await;
        assert_eq!(manager.mode(), Some(ThemeMode::Dark));
    }

    #[tokio::test]
    async fn test_persisted_value_beats_system_preference() {
        let store = Arc::new(FlakyStore::with_entries(&[(keys::THEME, "dark")]));
        let manager = ThemeManager::load(store, env(Some(ColorScheme::Light))).await;
        assert_eq!(manager.mode(), Some(ThemeMode::Dark));
    }

    #[tokio::test]
    async fn test_malformed_value_treated_as_absent() {
        let store = Arc::new(FlakyStore::with_entries(&[(keys::THEME, "\"sepia\"")]));
        let manager = ThemeManager::load(store, env(Some(ColorScheme::Light))).await;
        assert_eq!(manager.mode(), Some(ThemeMode::Light));
    }

    #[tokio::test]
    async fn test_read_failure_defaults_to_dark() {
        let store = Arc::new(FlakyStore::new());
        store.set_fail_reads(true);
        let manager = ThemeManager::load(store, env(Some(ColorScheme::Light))).await;
        assert_eq!(manager.mode(), Some(ThemeMode::Dark));
    }

    #[tokio::test]
    async fn test_system_preference_sampled_once() {
        let environment = env(Some(ColorScheme::Light));
        let manager = ThemeManager::load(Arc::new(FlakyStore::new()), environment.clone()).await;

        environment.set_color_scheme(Some(ColorScheme::Dark));
        assert_eq!(manager.init().await, ThemeMode::Light);
        assert_eq!(manager.mode(), Some(ThemeMode::Light));
    }

    #[tokio::test]
    async fn test_toggle_persists() {
        let store = Arc::new(FlakyStore::new());
        let manager = ThemeManager::load(store.clone(), env(None)).await;

        manager.toggle_theme().unwrap().wait().await.unwrap();
        assert_eq!(manager.mode(), Some(ThemeMode::Light));
        assert_eq!(store.get(keys::THEME).await.unwrap().as_deref(), Some("light"));

        manager.toggle_theme().unwrap().wait().await.unwrap();
        assert_eq!(manager.mode(), Some(ThemeMode::Dark));
        assert_eq!(store.get(keys::THEME).await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_rapid_toggles_persist_last_state() {
        let store = Arc::new(FlakyStore::new());
        let manager = ThemeManager::load(store.clone(), env(None)).await;

        let _ = manager.toggle_theme().unwrap();
        let _ = manager.toggle_theme().unwrap();
        let last = manager.toggle_theme().unwrap();
        assert_eq!(manager.mode(), Some(ThemeMode::Light));

        last.wait().await.unwrap();
        assert_eq!(store.get(keys::THEME).await.unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_optimistic_value() {
        let store = Arc::new(FlakyStore::new());
        let manager = ThemeManager::load(store.clone(), env(None)).await;
        store.set_fail_writes(true);

        let pending = manager.set_theme_mode(ThemeMode::Light).unwrap();
        assert_eq!(manager.mode(), Some(ThemeMode::Light));
        assert!(pending.wait().await.is_err());
        assert_eq!(manager.mode(), Some(ThemeMode::Light));
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let manager = ThemeManager::new(Arc::new(FlakyStore::new()), env(Some(ColorScheme::Dark)));
        let mut rx = manager.subscribe();
        assert_eq!(*rx.borrow(), ThemeState::Loading);

        manager.init().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ThemeState::Ready(ThemeMode::Dark));

        let _ = manager.toggle_theme().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ThemeState::Ready(ThemeMode::Light));
    }
}
