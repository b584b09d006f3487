//! Fake host implementation for testing.
//!
//! `FakeHost` implements the [`HostList`] trait over an in-memory node
//! arena and adds two kinds of helpers on top:
//! - host-side mutators (`insert_item`, `remove_item`, `rebuild_region`)
//!   that simulate the host's own renderer, which this crate never
//!   controls;
//! - assertion helpers (`container`, `items_in`, `loose_items`, ...)
//!   for inspecting the partition an engine pass produced.
//!
//! Node ids are never reused, so a wholesale region rebuild invalidates
//! every prior handle exactly like a real re-render would.

use std::collections::BTreeMap;

use crate::id::ItemId;

use super::{ContainerEntry, ContainerKey, ContainerMeta, HostList, ItemEntry, NodeId};

#[derive(Debug)]
enum FakeNode {
    OverlayRoot,
    Container {
        key: ContainerKey,
        meta: ContainerMeta,
    },
    Item {
        id: ItemId,
        initialized: bool,
    },
}

#[derive(Debug)]
struct Entry {
    node: FakeNode,
    /// `None` means directly under the list region.
    parent: Option<NodeId>,
}

/// In-memory host list for tests.
#[derive(Debug, Default)]
pub struct FakeHost {
    // BTreeMap keeps enumeration in node-creation order, which stands in
    // for document order.
    nodes: BTreeMap<NodeId, Entry>,
    next_id: NodeId,
    region_missing: bool,
}

impl FakeHost {
    /// An empty, ready region.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ready region pre-populated with loose items.
    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let mut host = Self::new();
        for item in items {
            host.insert_item(item);
        }
        host
    }

    fn allocate(&mut self, node: FakeNode, parent: Option<NodeId>) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Entry { node, parent });
        id
    }

    // --- Host-side mutators (the host's own renderer) ---

    /// The host renders a new item directly under the region.
    pub fn insert_item(&mut self, item: impl Into<ItemId>) -> NodeId {
        let item = item.into();
        self.allocate(
            FakeNode::Item {
                id: item,
                initialized: false,
            },
            None,
        )
    }

    /// The host destroys an item's node wherever it currently sits.
    pub fn remove_item(&mut self, item: &ItemId) {
        if let Some(node) = self.item_node(item) {
            self.nodes.remove(&node);
        }
    }

    /// The host wholesale-replaces the region: every node (items and
    /// overlay alike) is destroyed and fresh item nodes appear.
    pub fn rebuild_region<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.nodes.clear();
        for item in items {
            self.insert_item(item);
        }
    }

    /// Simulate the region anchor disappearing from the host markup.
    pub fn set_region_missing(&mut self, missing: bool) {
        self.region_missing = missing;
    }

    // --- Assertion helpers ---

    /// Node of the first container matching `key`, in document order.
    pub fn container(&self, key: &ContainerKey) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, entry)| match &entry.node {
            FakeNode::Container { key: k, .. } if k == key => Some(*id),
            _ => None,
        })
    }

    /// Displayed state of a container node.
    pub fn container_meta(&self, node: NodeId) -> Option<&ContainerMeta> {
        match self.nodes.get(&node).map(|entry| &entry.node) {
            Some(FakeNode::Container { meta, .. }) => Some(meta),
            _ => None,
        }
    }

    /// Items inside `container`, in document order.
    pub fn items_in(&self, container: NodeId) -> Vec<ItemId> {
        self.nodes
            .values()
            .filter(|entry| entry.parent == Some(container))
            .filter_map(|entry| match &entry.node {
                FakeNode::Item { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Items sitting directly under the region (unmanaged).
    pub fn loose_items(&self) -> Vec<ItemId> {
        self.nodes
            .values()
            .filter(|entry| entry.parent.is_none())
            .filter_map(|entry| match &entry.node {
                FakeNode::Item { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// The node currently rendering `item`.
    pub fn item_node(&self, item: &ItemId) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, entry)| match &entry.node {
            FakeNode::Item { id: iid, .. } if iid == item => Some(*id),
            _ => None,
        })
    }

    /// Total overlay roots present.
    pub fn root_count(&self) -> usize {
        self.overlay_roots().len()
    }

    /// Total containers present, across all roots.
    pub fn container_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|entry| matches!(entry.node, FakeNode::Container { .. }))
            .count()
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for (id, entry) in &self.nodes {
                if entry.parent == Some(current) {
                    found.push(*id);
                    stack.push(*id);
                }
            }
        }
        found
    }
}

impl HostList for FakeHost {
    fn region_ready(&self) -> bool {
        !self.region_missing
    }

    fn overlay_roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, entry)| matches!(entry.node, FakeNode::OverlayRoot))
            .map(|(id, _)| *id)
            .collect()
    }

    fn create_overlay_root(&mut self) -> NodeId {
        self.allocate(FakeNode::OverlayRoot, None)
    }

    fn containers_in(&self, root: NodeId) -> Vec<ContainerEntry> {
        self.nodes
            .iter()
            .filter(|(_, entry)| entry.parent == Some(root))
            .filter_map(|(id, entry)| match &entry.node {
                FakeNode::Container { key, .. } => Some(ContainerEntry {
                    node: *id,
                    key: key.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    fn create_container(
        &mut self,
        root: NodeId,
        key: ContainerKey,
        meta: &ContainerMeta,
    ) -> NodeId {
        self.allocate(
            FakeNode::Container {
                key,
                meta: meta.clone(),
            },
            Some(root),
        )
    }

    fn update_container(&mut self, node: NodeId, meta: &ContainerMeta) {
        if let Some(Entry {
            node: FakeNode::Container { meta: current, .. },
            ..
        }) = self.nodes.get_mut(&node)
        {
            *current = meta.clone();
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        for child in self.descendants(node) {
            self.nodes.remove(&child);
        }
        self.nodes.remove(&node);
    }

    fn enumerate_items(&self) -> Vec<ItemEntry> {
        self.nodes
            .iter()
            .filter_map(|(id, entry)| match &entry.node {
                FakeNode::Item { id: item, .. } => Some(ItemEntry {
                    node: *id,
                    item: item.clone(),
                    parent: entry.parent,
                }),
                _ => None,
            })
            .collect()
    }

    fn relocate(&mut self, item: NodeId, container: NodeId) {
        if let Some(entry) = self.nodes.get_mut(&item) {
            entry.parent = Some(container);
        }
    }

    fn item_initialized(&self, item: NodeId) -> bool {
        matches!(
            self.nodes.get(&item).map(|entry| &entry.node),
            Some(FakeNode::Item {
                initialized: true,
                ..
            })
        )
    }

    fn mark_item_initialized(&mut self, item: NodeId) {
        if let Some(Entry {
            node: FakeNode::Item { initialized, .. },
            ..
        }) = self.nodes.get_mut(&item)
        {
            *initialized = true;
        }
    }
}
