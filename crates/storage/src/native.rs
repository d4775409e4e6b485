//! Native on-device store
//!
//! Backed by sled. Stands in for the secure storage facility on mobile
//! targets; the adapter adds no encryption of its own.

use async_trait::async_trait;
use sled::Db;
use std::sync::Arc;

use crate::kv::{KeyValueStore, Result, StorageError};

/// Native store configuration
#[derive(Debug, Clone)]
pub struct NativeStoreConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Flush interval in milliseconds (None flushes on every write)
    pub flush_every_ms: Option<u64>,
}

impl Default for NativeStoreConfig {
    fn default() -> Self {
        Self {
            path: "matchday_native.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: None,
        }
    }
}

impl NativeStoreConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Sled-backed store
#[derive(Clone)]
pub struct NativeStore {
    db: Arc<Db>,
    flush_each_write: bool,
}

impl NativeStore {
    /// Open (or create) the store described by `config`
    pub fn open(config: NativeStoreConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;

        tracing::debug!(path = %config.path, "opened native store");

        Ok(Self {
            db: Arc::new(db),
            flush_each_write: config.flush_every_ms.is_none(),
        })
    }

    /// Create a temporary store that is deleted on drop (for testing)
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db: Arc::new(db), flush_each_write: false })
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for NativeStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| StorageError::InvalidUtf8(key.to_string())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        if self.flush_each_write {
            self.db.flush_async().await?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        if self.flush_each_write {
            self.db.flush_async().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = NativeStore::temporary().unwrap();
        assert!(store.is_empty());

        store.set("@app_theme", "dark").await.unwrap();
        assert_eq!(store.get("@app_theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);

        store.remove("@app_theme").await.unwrap();
        assert_eq!(store.get("@app_theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_key() {
        let store = NativeStore::temporary().unwrap();
        store.remove("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("native.db");
        let config = NativeStoreConfig::new(path.to_string_lossy());

        {
            let store = NativeStore::open(config.clone()).unwrap();
            store.set("fav_teams", "[{\"id\":1}]").await.unwrap();
            store.flush().await.unwrap();
        }

        let store = NativeStore::open(config).unwrap();
        assert_eq!(store.get("fav_teams").await.unwrap().as_deref(), Some("[{\"id\":1}]"));
    }

    #[test]
    fn test_config_builder() {
        let config = NativeStoreConfig::new("custom.db")
            .cache_capacity(1024)
            .use_compression(false)
            .flush_every_ms(Some(250));

        assert_eq!(config.path, "custom.db");
        assert_eq!(config.cache_capacity, 1024);
        assert!(!config.use_compression);
        assert_eq!(config.flush_every_ms, Some(250));
    }
}
