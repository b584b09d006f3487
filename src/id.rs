//! Identifier types: folder ids plus the host-supplied item and scope ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique folder identifier.
///
/// Format: `folder_{timestamp_ms}_{random_hex}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId {
    timestamp_ms: i64,
    random: [u8; 8],
}

impl FolderId {
    /// Generate a new folder ID.
    pub fn new() -> Self {
        let mut random = [0u8; 8];
        getrandom::getrandom(&mut random).expect("Failed to generate random bytes");

        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            random,
        }
    }

    /// When this ID was generated.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Parse a folder ID from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_prefix("folder_")?;
        let (ts, random_hex) = s.split_once('_')?;

        let timestamp_ms: i64 = ts.parse().ok()?;
        let random_bytes = hex::decode(random_hex).ok()?;
        if random_bytes.len() != 8 {
            return None;
        }

        let mut random = [0u8; 8];
        random.copy_from_slice(&random_bytes);

        Some(Self {
            timestamp_ms,
            random,
        })
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folder_{}_{}", self.timestamp_ms, hex::encode(self.random))
    }
}

// Custom serialization to store as string (also used as a JSON map key).
impl Serialize for FolderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FolderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FolderId::parse(&s).ok_or_else(|| serde::de::Error::custom("Invalid folder ID format"))
    }
}

/// A stable item identifier supplied by the host (a chat file name or
/// similar). Never generated by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The owner scope that namespaces folders and memberships (the
/// selected conversation partner, in a chat host).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
