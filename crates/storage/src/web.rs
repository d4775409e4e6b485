//! Web local-storage store
//!
//! Browser builds persist through a flat string map. Here the map is kept in
//! memory and mirrored to a single JSON file after every mutation, written
//! atomically (temp file + rename) and guarded by a checksum so a torn or
//! hand-edited file is detected on open.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::kv::{KeyValueStore, Result};

/// Current file format version
const FORMAT_VERSION: u32 = 1;

/// Web store configuration
#[derive(Debug, Clone)]
pub struct WebStoreConfig {
    /// Path to the backing file
    pub path: PathBuf,
}

impl Default for WebStoreConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("matchday_local_storage.json") }
    }
}

impl WebStoreConfig {
    /// Create a new configuration
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StorageFile {
    version: u32,
    checksum: String,
    data: BTreeMap<String, String>,
}

impl StorageFile {
    fn new(data: BTreeMap<String, String>) -> Result<Self> {
        let checksum = checksum(&data)?;
        Ok(Self { version: FORMAT_VERSION, checksum, data })
    }

    fn is_intact(&self) -> bool {
        matches!(checksum(&self.data), Ok(sum) if sum == self.checksum)
    }
}

fn checksum(data: &BTreeMap<String, String>) -> Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(format!("{:x}", md5::compute(json)))
}

/// File-mirrored string map
pub struct WebStore {
    config: WebStoreConfig,
    entries: Mutex<BTreeMap<String, String>>,
}

impl WebStore {
    /// Open the store, loading any existing file
    ///
    /// A missing file starts empty. An unreadable, corrupt or
    /// version-mismatched file is logged and also starts empty; it is
    /// overwritten by the next write.
    pub async fn open(config: WebStoreConfig) -> Result<Self> {
        let entries = match fs::read_to_string(&config.path).await {
            Ok(contents) => match serde_json::from_str::<StorageFile>(&contents) {
                Ok(file) if file.version == FORMAT_VERSION && file.is_intact() => file.data,
                Ok(file) => {
                    tracing::warn!(
                        path = %config.path.display(),
                        version = file.version,
                        "discarding web storage file with bad checksum or version"
                    );
                    BTreeMap::new()
                }
                Err(e) => {
                    tracing::warn!(path = %config.path.display(), "unparseable web storage file: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { config, entries: Mutex::new(entries) })
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.config.path
    }

    /// Apply `f` to a copy of the map, persist it, then commit it in memory
    async fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        f(&mut next);
        self.write_atomic(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn write_atomic(&self, data: &BTreeMap<String, String>) -> Result<()> {
        let file = StorageFile::new(data.clone())?;
        let json = serde_json::to_string(&file)?;

        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.config.path.with_extension("tmp");
        let mut out = fs::File::create(&temp_path).await?;
        out.write_all(json.as_bytes()).await?;
        out.sync_all().await?;
        drop(out);

        fs::rename(&temp_path, &self.config.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for WebStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|map| {
            map.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if !self.entries.lock().await.contains_key(key) {
            return Ok(());
        }
        self.mutate(|map| {
            map.remove(key);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = WebStore::open(WebStoreConfig::new(dir.path().join("ls.json"))).await.unwrap();
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let config = WebStoreConfig::new(dir.path().join("ls.json"));

        {
            let store = WebStore::open(config.clone()).await.unwrap();
            store.set("@search_history", "[\"arsenal\"]").await.unwrap();
            store.set("@app_theme", "light").await.unwrap();
            store.remove("@app_theme").await.unwrap();
        }

        let store = WebStore::open(config).await.unwrap();
        assert_eq!(
            store.get("@search_history").await.unwrap().as_deref(),
            Some("[\"arsenal\"]")
        );
        assert_eq!(store.get("@app_theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ls.json");
        fs::write(&path, "{\"version\":1,\"checksum\":\"nope\",\"data\":{\"k\":\"v\"}}")
            .await
            .unwrap();

        let store = WebStore::open(WebStoreConfig::new(&path)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // The next write replaces the corrupt file
        store.set("k", "fresh").await.unwrap();
        let reopened = WebStore::open(WebStoreConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_garbage_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ls.json");
        fs::write(&path, "not json at all").await.unwrap();

        let store = WebStore::open(WebStoreConfig::new(&path)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_map_unchanged() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the temp file makes File::create fail
        let path = dir.path().join("ls.json");
        std::fs::create_dir(dir.path().join("ls.tmp")).unwrap();

        let store = WebStore::open(WebStoreConfig::new(&path)).await.unwrap();
        assert!(store.set("k", "v").await.is_err());
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
