//! Mock settings implementation for testing.
//!
//! `MemorySettings` implements the [`SettingsStore`] trait entirely in
//! memory and counts flushes, so tests can assert that a burst of
//! mutations was debounced into a single persistence write. It can also
//! be configured to fail its next flush to exercise the retry path.

use std::collections::HashMap;

use anyhow::anyhow;
use serde_json::Value;

use crate::error::Result;

use super::SettingsStore;

/// In-memory [`SettingsStore`] for tests and ephemeral embeddings.
#[derive(Debug, Default)]
pub struct MemorySettings {
    entries: HashMap<String, Value>,
    dirty: bool,
    flushes: usize,
    fail_next_flush: bool,
}

impl MemorySettings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one blob (for migration tests).
    pub fn seeded(key: &str, value: Value) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value);
        store
    }

    /// How many times `flush` actually persisted.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Make the next `flush` fail, leaving the snapshot dirty.
    pub fn fail_next_flush(&mut self) {
        self.fail_next_flush = true;
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if self.fail_next_flush {
            self.fail_next_flush = false;
            return Err(anyhow!("simulated flush failure").into());
        }
        self.flushes += 1;
        self.dirty = false;
        Ok(())
    }

    fn dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_what_set_stored() {
        let mut store = MemorySettings::new();
        assert!(store.get("layout").is_none());

        store.set("layout", json!({"a": 1}));
        assert_eq!(store.get("layout"), Some(json!({"a": 1})));
    }

    #[test]
    fn flush_is_noop_when_clean() {
        let mut store = MemorySettings::new();
        store.flush().unwrap();
        assert_eq!(store.flush_count(), 0);

        store.set("layout", json!({}));
        store.flush().unwrap();
        store.flush().unwrap();
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn failed_flush_leaves_snapshot_dirty() {
        let mut store = MemorySettings::new();
        store.set("layout", json!({}));
        store.fail_next_flush();

        assert!(store.flush().is_err());
        assert!(store.dirty());

        store.flush().unwrap();
        assert!(!store.dirty());
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn seeded_store_is_clean() {
        let store = MemorySettings::seeded("layout", json!({"folders": {}}));
        assert!(!store.dirty());
        assert!(store.get("layout").is_some());
    }
}
