//! Host list-view adapter.
//!
//! The host application owns the list region: it creates and destroys
//! item nodes on its own schedule, outside this crate's control. The
//! engine only ever touches the region through the narrow [`HostList`]
//! trait — enumerate, re-parent, manage its own marker-tagged overlay
//! nodes — so the whole reconciliation core is testable against
//! [`FakeHost`] with no real rendering surface.
//!
//! Relocation is a single re-parent of the host's own node, never a
//! clone: host-attached interactive content must keep working after a
//! pass.

pub mod fake;

pub use fake::FakeHost;

use crate::id::{FolderId, ItemId};
use crate::store::FolderColor;

/// Opaque handle to a node in the host's render tree.
pub type NodeId = u64;

/// Identity of an engine-owned container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerKey {
    /// Container for one persisted folder.
    Folder(FolderId),
    /// The single virtual catch-all for unassigned items.
    Ungrouped,
}

/// Displayed container state, patched by the engine each pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerMeta {
    pub label: String,
    /// Rendered-children count, recomputed from final placement.
    pub count: usize,
    pub collapsed: bool,
    /// Only the ungrouped container is ever hidden, and only when empty.
    pub hidden: bool,
    pub color: Option<FolderColor>,
}

/// One item currently present anywhere under the list region.
#[derive(Debug, Clone)]
pub struct ItemEntry {
    pub node: NodeId,
    pub item: ItemId,
    /// Current parent container, or `None` when loose under the region.
    pub parent: Option<NodeId>,
}

/// One engine-owned container found under an overlay root.
#[derive(Debug, Clone)]
pub struct ContainerEntry {
    pub node: NodeId,
    pub key: ContainerKey,
}

/// What kind of region change the host observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Children were added, removed, or re-parented.
    ChildList,
    /// Visibility of region content changed.
    Visibility,
}

/// A change notification from the host's list region.
#[derive(Debug, Clone, Copy)]
pub struct RegionChange {
    pub kind: ChangeKind,
    /// Whether the change originated inside an engine-owned (marker
    /// tagged) subtree. Such changes are the engine's own writes and
    /// must not re-trigger it.
    pub in_overlay: bool,
}

impl RegionChange {
    /// A host-originated child-list change.
    pub fn child_list() -> Self {
        Self {
            kind: ChangeKind::ChildList,
            in_overlay: false,
        }
    }

    /// A host-originated visibility change.
    pub fn visibility() -> Self {
        Self {
            kind: ChangeKind::Visibility,
            in_overlay: false,
        }
    }

    /// Mark this change as originating inside the overlay subtree.
    pub fn within_overlay(mut self) -> Self {
        self.in_overlay = true;
        self
    }
}

/// Adapter over the host's live list region.
///
/// Node handles stay valid until the node is removed; a host rebuild of
/// the region invalidates all previous handles and presents fresh ones,
/// which a later pass re-partitions from scratch.
pub trait HostList {
    /// Whether the expected region anchor is present in the host markup.
    fn region_ready(&self) -> bool;

    /// Engine-owned overlay roots directly under the region, in document
    /// order. A healthy region has exactly one.
    fn overlay_roots(&self) -> Vec<NodeId>;

    /// Create a new overlay root directly under the region.
    fn create_overlay_root(&mut self) -> NodeId;

    /// Engine-owned containers under `root`, in document order.
    fn containers_in(&self, root: NodeId) -> Vec<ContainerEntry>;

    /// Create a container for `key` under `root`.
    fn create_container(&mut self, root: NodeId, key: ContainerKey, meta: &ContainerMeta)
        -> NodeId;

    /// Patch a container's displayed state.
    fn update_container(&mut self, node: NodeId, meta: &ContainerMeta);

    /// Remove a node and its remaining descendants.
    fn remove_node(&mut self, node: NodeId);

    /// Every item currently anywhere under the region, including items
    /// still sitting in containers from a prior pass.
    fn enumerate_items(&self) -> Vec<ItemEntry>;

    /// Re-parent an item node into a container. Must preserve the node
    /// itself (no clone/rebuild).
    fn relocate(&mut self, item: NodeId, container: NodeId);

    /// Whether the per-item interaction hook already ran for this node.
    fn item_initialized(&self, item: NodeId) -> bool;

    /// Record that the per-item hook ran for this node.
    fn mark_item_initialized(&mut self, item: NodeId);
}
