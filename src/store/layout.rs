//! Persisted layout blob.
//!
//! This is the single JSON document kept in the host's settings storage:
//! every folder record plus the per-scope folder lists. Any missing
//! top-level key (or missing folder field) is populated with its default
//! on load, giving forward-compatible migration without a dedicated step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::{FolderId, ItemId, ScopeId};

/// Current schema version written into new blobs.
pub const SCHEMA_VERSION: u32 = 1;

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Folder color: light and dark mode hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderColor {
    pub light: String,
    pub dark: String,
}

impl FolderColor {
    /// A color used for both light and dark rendering.
    pub fn uniform(hex: impl Into<String>) -> Self {
        let hex = hex.into();
        Self {
            light: hex.clone(),
            dark: hex,
        }
    }
}

/// One persisted folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub name: String,

    /// Member items, in assignment order.
    #[serde(default)]
    pub member_ids: Vec<ItemId>,

    #[serde(default)]
    pub collapsed: bool,

    /// Display position within the owning scope; ties resolved by the
    /// scope list's insertion sequence.
    #[serde(default)]
    pub order: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<FolderColor>,
}

impl FolderRecord {
    /// A fresh folder with the given name and display position.
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            name: name.into(),
            member_ids: Vec::new(),
            collapsed: false,
            order,
            color: None,
        }
    }
}

/// The whole persisted blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Folder records by id.
    #[serde(default)]
    pub folders: HashMap<FolderId, FolderRecord>,

    /// Ordered folder ids per owner scope.
    #[serde(default)]
    pub owner_scopes: HashMap<ScopeId, Vec<FolderId>>,

    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            folders: HashMap::new(),
            owner_scopes: HashMap::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl Layout {
    /// Folder ids belonging to `scope`, in insertion sequence.
    pub fn scope_list(&self, scope: &ScopeId) -> &[FolderId] {
        self.owner_scopes
            .get(scope)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Folders of `scope` sorted for display: by `order`, ties resolved
    /// by position in the scope list.
    pub fn scoped(&self, scope: &ScopeId) -> Vec<(&FolderId, &FolderRecord)> {
        let mut folders: Vec<(&FolderId, &FolderRecord)> = self
            .scope_list(scope)
            .iter()
            .filter_map(|id| self.folders.get(id).map(|record| (id, record)))
            .collect();
        // Stable sort keeps scope-list order for equal `order` values.
        folders.sort_by_key(|(_, record)| record.order);
        folders
    }

    /// The folder `item` belongs to within `scope`, if any.
    pub fn folder_of(&self, scope: &ScopeId, item: &ItemId) -> Option<&FolderId> {
        self.scope_list(scope).iter().find(|id| {
            self.folders
                .get(*id)
                .is_some_and(|record| record.member_ids.contains(item))
        })
    }

    /// Remove `item` from every folder in `scope`.
    pub fn detach_item(&mut self, scope: &ScopeId, item: &ItemId) {
        let ids: Vec<FolderId> = self.scope_list(scope).to_vec();
        for id in ids {
            if let Some(record) = self.folders.get_mut(&id) {
                record.member_ids.retain(|member| member != item);
            }
        }
    }
}
