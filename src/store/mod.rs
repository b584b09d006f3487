//! Persisted folder/membership data, scoped by owner.
//!
//! This module provides the [`GroupingStore`], the leaf of the dependency
//! chain: it owns no cache — every read re-derives from the persisted
//! blob held by the settings collaborator, so there is never a stale
//! in-memory copy to reconcile against storage. Mutations write the full
//! blob back immediately and schedule a debounced flush.

pub mod layout;

pub use layout::{FolderColor, FolderRecord, Layout, SCHEMA_VERSION};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::id::{FolderId, ItemId, ScopeId};
use crate::schedule::{DebounceSlot, Tick};
use crate::scope::ScopeResolver;
use crate::settings::SettingsStore;

/// Settings key the layout blob lives under.
pub const SETTINGS_KEY: &str = "corral.layout";

/// Ticks between the last mutation and the persistence flush.
pub const FLUSH_DEBOUNCE: Tick = 250;

/// Maximum folder name length; longer names are truncated.
pub const MAX_FOLDER_NAME: usize = 50;

/// Trim a raw folder name and cap its length. `None` when blank.
pub fn normalize_folder_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_FOLDER_NAME).collect())
}

/// An owned snapshot of one folder, as read from the blob.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderView {
    pub id: FolderId,
    pub name: String,
    pub collapsed: bool,
    pub order: u32,
    pub color: Option<FolderColor>,
    pub member_ids: Vec<ItemId>,
}

impl FolderView {
    fn from_record(id: &FolderId, record: &FolderRecord) -> Self {
        Self {
            id: id.clone(),
            name: record.name.clone(),
            collapsed: record.collapsed,
            order: record.order,
            color: record.color.clone(),
            member_ids: record.member_ids.clone(),
        }
    }
}

/// Persisted folder/membership store.
pub struct GroupingStore {
    settings: Rc<RefCell<dyn SettingsStore>>,
    resolver: Rc<dyn ScopeResolver>,
    flush: DebounceSlot,
}

impl GroupingStore {
    /// Create a store over the given settings and scope collaborators.
    pub fn new(
        settings: Rc<RefCell<dyn SettingsStore>>,
        resolver: Rc<dyn ScopeResolver>,
    ) -> Self {
        Self {
            settings,
            resolver,
            flush: DebounceSlot::idle(),
        }
    }

    /// Load the current layout from the settings blob.
    ///
    /// A missing blob is an empty layout; a malformed one degrades to
    /// empty with a warning rather than blocking every operation.
    pub fn layout(&self) -> Layout {
        match self.settings.borrow().get(SETTINGS_KEY) {
            None => Layout::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding malformed layout blob: {e}");
                Layout::default()
            }),
        }
    }

    /// Write `layout` back and schedule a debounced flush.
    fn commit(&mut self, layout: &Layout, now: Tick) {
        match serde_json::to_value(layout) {
            Ok(value) => {
                self.settings.borrow_mut().set(SETTINGS_KEY, value);
                self.flush.schedule(now + FLUSH_DEBOUNCE);
            }
            Err(e) => warn!("Failed to serialize layout, mutation not persisted: {e}"),
        }
    }

    /// Fire a due flush. Flush failure is logged and retried on the next
    /// schedule; the in-memory snapshot stays authoritative either way.
    pub fn tick(&mut self, now: Tick) {
        if self.flush.fire(now) {
            if let Err(e) = self.settings.borrow_mut().flush() {
                warn!("Settings flush failed, will retry: {e}");
                self.flush.schedule(now + FLUSH_DEBOUNCE);
            }
        }
    }

    /// Whether a flush is scheduled but not yet fired.
    pub fn flush_pending(&self) -> bool {
        self.flush.pending()
    }

    // --- Mutations ---

    /// Create a folder in `scope`. `order` is the scope's current folder
    /// count, so new folders append to the display.
    pub fn create_folder(&mut self, scope: &ScopeId, name: &str, now: Tick) -> FolderId {
        let mut layout = self.layout();
        let id = FolderId::new();

        let list = layout.owner_scopes.entry(scope.clone()).or_default();
        let order = list.len() as u32;
        list.push(id.clone());
        layout
            .folders
            .insert(id.clone(), FolderRecord::new(name, order));

        self.commit(&layout, now);
        id
    }

    /// Rename a folder. Unknown ids are ignored (benign race with a
    /// concurrent deletion).
    pub fn rename_folder(&mut self, id: &FolderId, name: &str, now: Tick) {
        self.patch_folder(id, now, |record| record.name = name.to_string());
    }

    /// Set a folder's collapsed state. Unknown ids are ignored.
    pub fn set_collapsed(&mut self, id: &FolderId, collapsed: bool, now: Tick) {
        self.patch_folder(id, now, |record| record.collapsed = collapsed);
    }

    /// Set or clear a folder's color. Unknown ids are ignored.
    pub fn set_color(&mut self, id: &FolderId, color: Option<FolderColor>, now: Tick) {
        self.patch_folder(id, now, |record| record.color = color);
    }

    fn patch_folder(&mut self, id: &FolderId, now: Tick, patch: impl FnOnce(&mut FolderRecord)) {
        let mut layout = self.layout();
        match layout.folders.get_mut(id) {
            Some(record) => {
                patch(record);
                self.commit(&layout, now);
            }
            None => debug!("Ignoring update to unknown folder {id}"),
        }
    }

    /// Delete a folder: remove it from every scope list and drop the
    /// record. Members fall back to ungrouped implicitly; nothing is
    /// rewritten for them. Idempotent.
    pub fn delete_folder(&mut self, id: &FolderId, now: Tick) {
        let mut layout = self.layout();
        if layout.folders.remove(id).is_none() && !scope_lists_contain(&layout, id) {
            return;
        }
        for list in layout.owner_scopes.values_mut() {
            list.retain(|fid| fid != id);
        }
        self.commit(&layout, now);
    }

    /// Move `item` within the active scope: detach it from every folder
    /// there, then attach to `target` if given and known. `None` or an
    /// unknown target leaves the item ungrouped. No-op without a scope.
    pub fn move_item(&mut self, item: &ItemId, target: Option<&FolderId>, now: Tick) {
        let Some(scope) = self.resolver.active_scope() else {
            debug!("Ignoring move of {item}: no active scope");
            return;
        };

        let mut layout = self.layout();
        layout.detach_item(&scope, item);

        if let Some(target) = target {
            if layout.scope_list(&scope).contains(target) {
                if let Some(record) = layout.folders.get_mut(target) {
                    record.member_ids.push(item.clone());
                }
            } else {
                debug!("Move target {target} not in scope {scope}, leaving {item} ungrouped");
            }
        }

        self.commit(&layout, now);
    }

    // --- Queries ---

    /// Folders of `scope` in display order.
    pub fn folders_for_scope(&self, scope: &ScopeId) -> Vec<FolderView> {
        self.layout()
            .scoped(scope)
            .into_iter()
            .map(|(id, record)| FolderView::from_record(id, record))
            .collect()
    }

    /// One folder by id, regardless of scope.
    pub fn folder(&self, id: &FolderId) -> Option<FolderView> {
        self.layout()
            .folders
            .get(id)
            .map(|record| FolderView::from_record(id, record))
    }

    /// The folder `item` belongs to within the active scope.
    pub fn folder_for_item(&self, item: &ItemId) -> Option<FolderId> {
        let scope = self.resolver.active_scope()?;
        self.layout().folder_of(&scope, item).cloned()
    }

    /// Item-to-folder assignment for a whole scope, derived in one blob
    /// read so a reconciliation pass stays O(items + folders).
    pub fn assignments(&self, scope: &ScopeId) -> HashMap<ItemId, FolderId> {
        let layout = self.layout();
        let mut assigned = HashMap::new();
        for (id, record) in layout.scoped(scope) {
            for item in &record.member_ids {
                assigned.entry(item.clone()).or_insert_with(|| id.clone());
            }
        }
        assigned
    }

    /// The resolver's current scope (convenience for callers that share
    /// this store's view of "current").
    pub fn active_scope(&self) -> Option<ScopeId> {
        self.resolver.active_scope()
    }
}

fn scope_lists_contain(layout: &Layout, id: &FolderId) -> bool {
    layout.owner_scopes.values().any(|list| list.contains(id))
}
