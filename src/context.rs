//! Application context
//!
//! Owns every store and hook for the lifetime of the app. Screens borrow
//! them through the accessors instead of reaching for globals.

use anyhow::Context as _;
use app_core::{DashboardHook, DashboardSource, ProfileHook, ProfileSource};
use app_platform::Environment;
use app_state::{FavoritesStore, SearchHistoryStore, ThemeManager};
use app_ui::ThemeProvider;
use networking::ApiClient;
use std::sync::Arc;
use storage::{KeyValueStore, NativeStore, NativeStoreConfig, PlatformStore, WebStore, WebStoreConfig};

use crate::config::AppConfig;

/// Scoped provider for the state layer
pub struct AppContext {
    config: AppConfig,
    environment: Arc<dyn Environment>,
    store: Arc<dyn KeyValueStore>,
    theme: Arc<ThemeManager>,
    favorites: FavoritesStore,
    history: SearchHistoryStore,
    api: Arc<ApiClient>,
    profile: ProfileHook,
    dashboard: DashboardHook,
}

impl AppContext {
    /// Open storage under the configured directory and load all state
    pub async fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        let environment = config.environment();
        Self::bootstrap_with_environment(config, environment).await
    }

    /// Like [`AppContext::bootstrap`] with an explicit environment
    pub async fn bootstrap_with_environment(
        config: AppConfig,
        environment: Arc<dyn Environment>,
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(config.storage_dir())
            .await
            .with_context(|| format!("creating storage directory {}", config.storage_dir().display()))?;

        let native_path = config.native_store_path();
        let native = NativeStore::open(NativeStoreConfig::new(native_path.to_string_lossy()))
            .with_context(|| format!("opening native store at {}", native_path.display()))?;

        let web_path = config.web_store_path();
        let web = WebStore::open(WebStoreConfig::new(web_path.clone()))
            .await
            .with_context(|| format!("opening web store at {}", web_path.display()))?;

        let store = PlatformStore::new(Arc::new(native), Arc::new(web), environment.clone());
        Self::with_store(config, Arc::new(store), environment).await
    }

    /// Build the context over an already opened store
    pub async fn with_store(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        environment: Arc<dyn Environment>,
    ) -> anyhow::Result<Self> {
        let (theme, favorites, history) = tokio::join!(
            ThemeManager::load(store.clone(), environment.clone()),
            FavoritesStore::load(store.clone()),
            SearchHistoryStore::load(store.clone()),
        );

        let platform = environment.platform();
        let api = Arc::new(ApiClient::new(config.api.clone(), platform).context("creating API client")?);
        let profile = ProfileHook::new(ProfileSource::new(api.clone()));
        let dashboard = DashboardHook::new(DashboardSource::new(api.clone()));

        tracing::info!(
            %platform,
            theme = ?theme.mode(),
            history = history.history().len(),
            api = api.base_url(),
            "app context ready"
        );

        Ok(Self {
            config,
            environment,
            store,
            theme: Arc::new(theme),
            favorites,
            history,
            api,
            profile,
            dashboard,
        })
    }

    /// Configuration the context was built from
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Host environment
    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.environment
    }

    /// Platform-routed key-value store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Theme manager
    pub fn theme(&self) -> &Arc<ThemeManager> {
        &self.theme
    }

    /// Theme provider for screens
    pub fn theme_provider(&self) -> ThemeProvider {
        ThemeProvider::new(self.theme.clone())
    }

    /// Favorites
    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Search history
    pub fn history(&self) -> &SearchHistoryStore {
        &self.history
    }

    /// API client
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Profile hook
    pub fn profile(&self) -> &ProfileHook {
        &self.profile
    }

    /// Dashboard hook
    pub fn dashboard(&self) -> &DashboardHook {
        &self.dashboard
    }
}
