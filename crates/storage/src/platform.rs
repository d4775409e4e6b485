//! Platform-routed store
//!
//! Routes each call to the native or web backend according to the platform
//! the environment reports at the moment of the call.

use app_platform::{Environment, Platform};
use async_trait::async_trait;
use std::sync::Arc;

use crate::kv::{KeyValueStore, Result};

/// Store that picks its backend per call
#[derive(Clone)]
pub struct PlatformStore {
    native: Arc<dyn KeyValueStore>,
    web: Arc<dyn KeyValueStore>,
    environment: Arc<dyn Environment>,
}

impl PlatformStore {
    /// Create a routed store over the two backends
    pub fn new(
        native: Arc<dyn KeyValueStore>,
        web: Arc<dyn KeyValueStore>,
        environment: Arc<dyn Environment>,
    ) -> Self {
        Self { native, web, environment }
    }

    /// Backend for the current platform; never cached
    fn backend(&self) -> (&dyn KeyValueStore, Platform) {
        let platform = self.environment.platform();
        if platform.is_web() {
            (self.web.as_ref(), platform)
        } else {
            (self.native.as_ref(), platform)
        }
    }
}

#[async_trait]
impl KeyValueStore for PlatformStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let (backend, platform) = self.backend();
        tracing::trace!(key, %platform, "storage get");
        backend.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (backend, platform) = self.backend();
        tracing::trace!(key, %platform, "storage set");
        backend.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let (backend, platform) = self.backend();
        tracing::trace!(key, %platform, "storage remove");
        backend.remove(key).await
    }
}
