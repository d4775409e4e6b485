//! Storage layer for Matchday
//!
//! This crate provides the string key-value adapter the state stores
//! persist through, its native, web and in-memory backends, and the
//! per-key write queue that keeps persisted writes in invocation order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod keys;
pub mod kv;
pub mod native;
pub mod platform;
pub mod queue;
pub mod web;

pub use kv::{KeyValueStore, KeyValueStoreExt, MemoryStore, Result, StorageError};
pub use native::{NativeStore, NativeStoreConfig};
pub use platform::PlatformStore;
pub use queue::{PendingWrite, WriteQueue};
pub use web::{WebStore, WebStoreConfig};
