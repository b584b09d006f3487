//! Persisted-settings collaborator.
//!
//! The host application owns the real settings storage: an asynchronous
//! key/value store of JSON-serializable blobs. This module provides:
//! - [`SettingsStore`] trait for storage abstraction
//! - [`MemorySettings`] capturing implementation for tests
//! - [`FileSettings`] JSON-file implementation for standalone embeddings
//!
//! Reads and writes are synchronous against an in-memory snapshot; the
//! expensive persistence step is the explicit [`SettingsStore::flush`],
//! which the grouping store schedules through a debounce so bursts of
//! mutations cost one write.

pub mod file;
pub mod memory;

pub use file::FileSettings;
pub use memory::MemorySettings;

use serde_json::Value;

use crate::error::Result;

/// Trait for the host's persisted-settings storage.
pub trait SettingsStore {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Replace the blob stored under `key`. Cheap; only touches the
    /// in-memory snapshot and marks it dirty.
    fn set(&mut self, key: &str, value: Value);

    /// Persist the current snapshot. A no-op when nothing changed since
    /// the last flush.
    fn flush(&mut self) -> Result<()>;

    /// Whether the snapshot has unpersisted changes.
    fn dirty(&self) -> bool;
}
