//! Recent search terms
//!
//! A most-recent-first list of at most [`MAX_HISTORY`] terms, unique under
//! case-insensitive comparison. Every mutation computes the next list from
//! the current in-memory list and queues a write of the whole list, both
//! under one lock, so back-to-back calls compose and their writes land in
//! call order.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storage::{keys, KeyValueStore, KeyValueStoreExt, PendingWrite, StorageError, WriteQueue};
use thiserror::Error;

/// Maximum number of remembered terms
pub const MAX_HISTORY: usize = 10;

/// Search history errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading the persisted list failed
    #[error("Failed to read search history: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for search history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Owner of the recent-search list
pub struct SearchHistoryStore {
    store: Arc<dyn KeyValueStore>,
    queue: WriteQueue,
    entries: Mutex<Vec<String>>,
    /// Bumped by every mutation while `entries` is locked
    generation: AtomicU64,
}

impl SearchHistoryStore {
    /// Load the persisted list
    ///
    /// Read failures and malformed data start with an empty list.
    /// Must be called within a Tokio runtime.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match read_list(store.as_ref()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("failed to load search history, starting empty: {}", e);
                Vec::new()
            }
        };

        Self {
            queue: WriteQueue::new(store.clone(), keys::SEARCH_HISTORY),
            store,
            entries: Mutex::new(entries),
            generation: AtomicU64::new(0),
        }
    }

    /// Current list, most recent first
    pub fn history(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Record a search term
    ///
    /// Blank terms are ignored and return `None`.
    pub fn add_to_history(&self, term: &str) -> Option<PendingWrite> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        Some(self.mutate(|entries| push_term(entries, term)))
    }

    /// Remove an exact (case-sensitive) term
    pub fn remove_from_history(&self, term: &str) -> PendingWrite {
        self.mutate(|entries| entries.retain(|entry| entry != term))
    }

    /// Forget every term
    pub fn clear_history(&self) -> PendingWrite {
        self.mutate(|entries| entries.clear())
    }

    /// Re-read the persisted list, replacing the in-memory one
    ///
    /// Waits for queued writes first. A failed read keeps the current list;
    /// a malformed value is read as empty. If a mutation lands while the
    /// read is in flight, the value read is stale and the in-memory list,
    /// whose write is already queued, is kept and returned.
    pub async fn refresh_history(&self) -> Result<Vec<String>> {
        // Sampled before the flush so every later mutation is noticed
        let started = self.generation.load(Ordering::SeqCst);
        if let Err(e) = self.queue.flush().await {
            tracing::debug!("write queue unavailable before refresh: {}", e);
        }

        let entries = match read_list(self.store.as_ref()).await {
            Ok(entries) => entries,
            Err(e) if e.is_malformed_value() => {
                tracing::warn!("discarding malformed search history: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("failed to refresh search history: {}", e);
                return Err(e.into());
            }
        };

        let mut current = self.entries.lock();
        if self.generation.load(Ordering::SeqCst) != started {
            tracing::debug!("search history changed during refresh, keeping in-memory list");
            return Ok(current.clone());
        }
        *current = entries.clone();
        Ok(entries)
    }

    fn mutate<F>(&self, f: F) -> PendingWrite
    where
        F: FnOnce(&mut Vec<String>),
    {
        let mut entries = self.entries.lock();
        f(&mut *entries);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.queue.enqueue(encode(&entries))
    }
}

/// Move `term` to the front, dropping case-insensitive duplicates and
/// anything past [`MAX_HISTORY`]
fn push_term(entries: &mut Vec<String>, term: &str) {
    let folded = term.to_lowercase();
    entries.retain(|entry| entry.to_lowercase() != folded);
    entries.insert(0, term.to_string());
    entries.truncate(MAX_HISTORY);
}

fn encode(entries: &[String]) -> String {
    serde_json::Value::from(entries.to_vec()).to_string()
}

async fn read_list(store: &dyn KeyValueStore) -> storage::Result<Vec<String>> {
    let entries: Vec<String> = store.get_json(keys::SEARCH_HISTORY).await?.unwrap_or_default();

    // Re-apply the list invariants to whatever was on disk
    let mut normalized: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let folded = entry.to_lowercase();
        if normalized.iter().all(|existing| existing.to_lowercase() != folded) {
            normalized.push(entry.to_string());
        }
    }
    normalized.truncate(MAX_HISTORY);
    Ok(normalized)
}
