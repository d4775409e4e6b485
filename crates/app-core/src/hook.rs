//! Fetch-and-hold hooks
//!
//! A [`Hook`] wraps one [`DataSource`] and keeps the last result in a watch
//! channel. A failed fetch never leaves the caller without data: the source's
//! fallback value is published together with the error message, and stays
//! there until the next explicit fetch.
//!
//! Overlapping fetches are not merged. The last one to finish decides `data`
//! and `error`, while `loading` stays set until none is in flight.

use async_trait::async_trait;
use networking::ApiError;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

/// Snapshot exposed to consumers
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Latest data, or the fallback after a failure
    pub data: T,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Message of the last failure, cleared by a successful fetch
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    /// Idle state holding `data`
    pub fn idle(data: T) -> Self {
        Self { data, loading: false, error: None }
    }

    /// Failed state holding fallback `data`
    pub fn failed(data: T, error: impl Into<String>) -> Self {
        Self { data, loading: false, error: Some(error.into()) }
    }

    /// Whether the last fetch failed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Remote data with a fixed fallback
#[async_trait]
pub trait DataSource: Send + Sync {
    /// View type produced by the source
    type Data: Clone + Send + Sync;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Issue the remote call(s)
    async fn fetch(&self) -> Result<Self::Data, ApiError>;

    /// Value shown before the first fetch and after a failure
    fn fallback(&self) -> Self::Data;
}

/// Holds the state of one data source
pub struct Hook<S: DataSource> {
    source: S,
    state: watch::Sender<FetchState<S::Data>>,
    in_flight: AtomicUsize,
}

impl<S: DataSource> Hook<S> {
    /// Create a hook; nothing is fetched until [`Hook::fetch`]
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(FetchState::idle(source.fallback()));
        Self { source, state, in_flight: AtomicUsize::new(0) }
    }

    /// Underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current snapshot
    pub fn state(&self) -> FetchState<S::Data> {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<FetchState<S::Data>> {
        self.state.subscribe()
    }

    /// Fetch from the source and publish the outcome
    ///
    /// Returns the snapshot published when this fetch finished.
    pub async fn fetch(&self) -> FetchState<S::Data> {
        let guard = InFlight::start(&self.in_flight, &self.state);

        let next = match self.source.fetch().await {
            Ok(data) => FetchState::idle(data),
            Err(e) => {
                tracing::warn!(source = self.source.name(), "fetch failed, using fallback: {}", e);
                FetchState::failed(self.source.fallback(), e.to_string())
            }
        };

        guard.finish(next)
    }

    /// Fetch again, typically after a failure
    pub async fn refetch(&self) -> FetchState<S::Data> {
        self.fetch().await
    }
}

/// Marks one fetch as running; clears its share of `loading` even when the
/// fetch future is dropped
struct InFlight<'a, T> {
    count: &'a AtomicUsize,
    state: &'a watch::Sender<FetchState<T>>,
    finished: bool,
}

impl<'a, T: Clone> InFlight<'a, T> {
    fn start(count: &'a AtomicUsize, state: &'a watch::Sender<FetchState<T>>) -> Self {
        state.send_modify(|current| {
            count.fetch_add(1, Ordering::SeqCst);
            current.loading = true;
        });
        Self { count, state, finished: false }
    }

    fn finish(mut self, next: FetchState<T>) -> FetchState<T> {
        self.finished = true;
        let count = self.count;
        let mut published = next;
        self.state.send_modify(|current| {
            published.loading = count.fetch_sub(1, Ordering::SeqCst) > 1;
            *current = published.clone();
        });
        published
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let count = self.count;
        self.state.send_modify(|current| {
            current.loading = count.fetch_sub(1, Ordering::SeqCst) > 1;
        });
    }
}
