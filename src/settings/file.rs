//! JSON-file settings storage.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde_json::Value;

use crate::error::Result;

use super::SettingsStore;

/// A [`SettingsStore`] backed by a single JSON file on disk.
///
/// Standalone embeddings that have no host settings API can use this;
/// the whole entry map is held in memory and written back on flush.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    entries: HashMap<String, Value>,
    dirty: bool,
}

impl FileSettings {
    /// Open the store at `path`, loading existing entries if the file
    /// exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings at {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings at {:?}", path))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Get the backing file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
    }

    /// Persist using atomic write.
    ///
    /// Uses the write-to-temp-then-rename pattern to prevent corruption
    /// if the process crashes or loses power during the write operation.
    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize settings")?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write settings to {:?}", temp_path))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to move settings into place at {:?}", self.path))?;

        self.dirty = false;
        Ok(())
    }

    fn dirty(&self) -> bool {
        self.dirty
    }
}
