//! Reconciliation engine.
//!
//! One pass classifies every item currently visible anywhere under the
//! host's list region and physically relocates it into the container
//! matching its stored assignment. Passes are convergent: persisted
//! state is the source of truth, so a pass can be dropped or aborted and
//! the next one restores the same partition. A second consecutive pass
//! with no intervening state change performs zero relocations.
//!
//! All mutable pass state lives in an explicit [`EngineSession`] owned
//! by the engine instance; there are no module-level flags.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::error::{CorralError, Result};
use crate::host::{ContainerKey, ContainerMeta, HostList, NodeId};
use crate::id::{ItemId, ScopeId};
use crate::scope::ScopeResolver;
use crate::store::{FolderView, GroupingStore};

/// Label shown on the virtual catch-all container.
pub const UNGROUPED_LABEL: &str = "Ungrouped";

/// Hook installed on each item exactly once per item lifetime (hosts
/// typically attach a context-menu trigger here).
pub type ItemHook = Box<dyn FnMut(&mut dyn HostList, NodeId, &ItemId)>;

/// How a requested pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The region was fully reconciled.
    Completed,
    /// No owner scope was resolvable; nothing was touched.
    NoScope,
    /// A pass was already in flight; this trigger was dropped.
    Dropped,
    /// A host anchor was missing; the pass was abandoned and will be
    /// retried from scratch on the next trigger.
    Aborted,
}

/// What one pass did, for logging and for idempotence assertions.
#[derive(Debug, Clone, Copy)]
pub struct PassReport {
    pub outcome: PassOutcome,
    pub items_seen: usize,
    pub relocations: usize,
    pub containers_created: usize,
    pub containers_removed: usize,
    pub roots_removed: usize,
}

impl PassReport {
    fn with_outcome(outcome: PassOutcome) -> Self {
        Self {
            outcome,
            items_seen: 0,
            relocations: 0,
            containers_created: 0,
            containers_removed: 0,
            roots_removed: 0,
        }
    }

    /// A report for a pass that never ran.
    pub fn skipped(outcome: PassOutcome) -> Self {
        Self::with_outcome(outcome)
    }
}

/// Structural drift the fallback check looks for between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    /// More than one overlay root under the region.
    DuplicateRoots(usize),
    /// Items present but no overlay root at all (host rebuilt the
    /// region, or first run).
    MissingRoot,
    /// Items parented outside any managed container.
    LooseItems(usize),
}

/// Mutable engine state, one per engine instance.
#[derive(Debug, Default)]
pub struct EngineSession {
    in_pass: bool,
    completed_passes: u64,
}

/// Keeps the live region partitioned into folder containers.
pub struct ReconciliationEngine {
    resolver: Rc<dyn ScopeResolver>,
    session: EngineSession,
    hook: Option<ItemHook>,
}

impl ReconciliationEngine {
    /// Create an engine resolving scopes through `resolver`.
    pub fn new(resolver: Rc<dyn ScopeResolver>) -> Self {
        Self {
            resolver,
            session: EngineSession::default(),
            hook: None,
        }
    }

    /// Install the per-item hook. Runs at most once per item lifetime,
    /// guarded by the host's initialized marker.
    pub fn set_item_hook(&mut self, hook: ItemHook) {
        self.hook = Some(hook);
    }

    /// Whether a pass is currently in flight.
    pub fn in_pass(&self) -> bool {
        self.session.in_pass
    }

    /// Passes that ran to completion since creation.
    pub fn completed_passes(&self) -> u64 {
        self.session.completed_passes
    }

    /// Run one reconciliation pass.
    ///
    /// Never queues: a trigger arriving while a pass is in flight is
    /// dropped ([`PassOutcome::Dropped`]). Returns
    /// [`CorralError::HostShapeMismatch`] when the region anchor is
    /// absent; callers swallow that and retry on the next trigger.
    pub fn run_pass(
        &mut self,
        host: &mut dyn HostList,
        store: &GroupingStore,
    ) -> Result<PassReport> {
        if self.session.in_pass {
            debug!("Dropping reconciliation trigger: pass already in flight");
            return Ok(PassReport::skipped(PassOutcome::Dropped));
        }
        let Some(scope) = self.resolver.active_scope() else {
            return Ok(PassReport::skipped(PassOutcome::NoScope));
        };

        self.session.in_pass = true;
        let result = self.reconcile(host, store, &scope);
        self.session.in_pass = false;

        if result.is_ok() {
            self.session.completed_passes += 1;
        }
        result
    }

    fn reconcile(
        &mut self,
        host: &mut dyn HostList,
        store: &GroupingStore,
        scope: &ScopeId,
    ) -> Result<PassReport> {
        if !host.region_ready() {
            return Err(CorralError::HostShapeMismatch {
                anchor: "list region".into(),
            });
        }

        let mut report = PassReport::with_outcome(PassOutcome::Completed);

        // Exactly one overlay root: keep the first, doom the rest. The
        // doomed ones are removed only after their items are relocated.
        let roots = host.overlay_roots();
        let (root, extra_roots) = match roots.split_first() {
            Some((&first, rest)) => (first, rest.to_vec()),
            None => (host.create_overlay_root(), Vec::new()),
        };

        // Canonical container per key inside the kept root; duplicates
        // from host-driven rebuilds are doomed.
        let mut canonical: HashMap<ContainerKey, NodeId> = HashMap::new();
        let mut doomed: Vec<NodeId> = Vec::new();
        for entry in host.containers_in(root) {
            if canonical.contains_key(&entry.key) {
                doomed.push(entry.node);
            } else {
                canonical.insert(entry.key, entry.node);
            }
        }

        // Ensure one container per folder (create once) plus the single
        // ungrouped container.
        let folders = store.folders_for_scope(scope);
        let mut live: HashSet<ContainerKey> = HashSet::new();
        for view in &folders {
            let key = ContainerKey::Folder(view.id.clone());
            live.insert(key.clone());
            if !canonical.contains_key(&key) {
                let node = host.create_container(root, key.clone(), &folder_meta(view, 0));
                canonical.insert(key, node);
                report.containers_created += 1;
            }
        }
        live.insert(ContainerKey::Ungrouped);
        if !canonical.contains_key(&ContainerKey::Ungrouped) {
            let node =
                host.create_container(root, ContainerKey::Ungrouped, &ungrouped_meta(0));
            canonical.insert(ContainerKey::Ungrouped, node);
            report.containers_created += 1;
        }

        // Containers whose folder left the store are doomed too; their
        // items relocate to their new destination below before removal.
        let stale: Vec<ContainerKey> = canonical
            .keys()
            .filter(|key| !live.contains(key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(node) = canonical.remove(&key) {
                doomed.push(node);
            }
        }

        // Classify and relocate every item, wherever it currently sits.
        let assigned = store.assignments(scope);
        let mut counts: HashMap<ContainerKey, usize> = HashMap::new();
        for entry in host.enumerate_items() {
            report.items_seen += 1;

            let key = assigned
                .get(&entry.item)
                .map(|id| ContainerKey::Folder(id.clone()))
                .filter(|key| canonical.contains_key(key))
                .unwrap_or(ContainerKey::Ungrouped);
            let dest = canonical[&key];

            if entry.parent != Some(dest) {
                host.relocate(entry.node, dest);
                report.relocations += 1;
            }
            *counts.entry(key).or_insert(0) += 1;

            if !host.item_initialized(entry.node) {
                if let Some(hook) = self.hook.as_mut() {
                    hook(&mut *host, entry.node, &entry.item);
                }
                host.mark_item_initialized(entry.node);
            }
        }

        // Patch displayed state from final placement: counts reflect
        // rendered children, never store membership.
        for view in &folders {
            let key = ContainerKey::Folder(view.id.clone());
            let count = counts.get(&key).copied().unwrap_or(0);
            host.update_container(canonical[&key], &folder_meta(view, count));
        }
        let ungrouped_count = counts.get(&ContainerKey::Ungrouped).copied().unwrap_or(0);
        host.update_container(
            canonical[&ContainerKey::Ungrouped],
            &ungrouped_meta(ungrouped_count),
        );

        report.containers_removed = doomed.len();
        report.roots_removed = extra_roots.len();
        for node in doomed {
            host.remove_node(node);
        }
        for extra in extra_roots {
            host.remove_node(extra);
        }

        debug!(
            scope = %scope,
            items = report.items_seen,
            relocations = report.relocations,
            "Reconciliation pass completed"
        );
        Ok(report)
    }

    /// Probe for structural drift without touching anything. Used by the
    /// detector's low-frequency fallback to catch notifications lost to
    /// coalescing or missed entirely.
    pub fn drift(&self, host: &dyn HostList) -> Option<Drift> {
        let roots = host.overlay_roots();
        if roots.len() > 1 {
            return Some(Drift::DuplicateRoots(roots.len()));
        }

        let items = host.enumerate_items();
        let Some(&root) = roots.first() else {
            return (!items.is_empty()).then_some(Drift::MissingRoot);
        };

        let managed: HashSet<NodeId> = host
            .containers_in(root)
            .into_iter()
            .map(|entry| entry.node)
            .collect();
        let loose = items
            .iter()
            .filter(|entry| !entry.parent.is_some_and(|parent| managed.contains(&parent)))
            .count();
        (loose > 0).then_some(Drift::LooseItems(loose))
    }
}

fn folder_meta(view: &FolderView, count: usize) -> ContainerMeta {
    ContainerMeta {
        label: view.name.clone(),
        count,
        collapsed: view.collapsed,
        hidden: false,
        color: view.color.clone(),
    }
}

fn ungrouped_meta(count: usize) -> ContainerMeta {
    ContainerMeta {
        label: UNGROUPED_LABEL.to_string(),
        count,
        collapsed: false,
        hidden: count == 0,
        color: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::host::FakeHost;
    use crate::scope::CurrentScope;
    use crate::settings::MemorySettings;

    fn fixture(scope: &str) -> (ReconciliationEngine, GroupingStore, FakeHost) {
        let settings = Rc::new(RefCell::new(MemorySettings::new()));
        let resolver = Rc::new(CurrentScope::selected(scope));
        let store = GroupingStore::new(settings, resolver.clone());
        let engine = ReconciliationEngine::new(resolver);
        (engine, store, FakeHost::new())
    }

    #[test]
    fn pass_without_scope_is_a_noop() {
        let settings = Rc::new(RefCell::new(MemorySettings::new()));
        let resolver = Rc::new(CurrentScope::new());
        let store = GroupingStore::new(settings, resolver.clone());
        let mut engine = ReconciliationEngine::new(resolver);
        let mut host = FakeHost::with_items(["chat1"]);

        let report = engine.run_pass(&mut host, &store).unwrap();
        assert_eq!(report.outcome, PassOutcome::NoScope);
        assert_eq!(host.root_count(), 0);
        assert_eq!(engine.completed_passes(), 0);
    }

    #[test]
    fn missing_region_aborts_pass_and_clears_guard() {
        let (mut engine, store, mut host) = fixture("charA");
        host.set_region_missing(true);

        let err = engine.run_pass(&mut host, &store).unwrap_err();
        assert!(matches!(err, CorralError::HostShapeMismatch { .. }));
        assert!(!engine.in_pass());

        // Next trigger retries the full pass from scratch.
        host.set_region_missing(false);
        let report = engine.run_pass(&mut host, &store).unwrap();
        assert_eq!(report.outcome, PassOutcome::Completed);
    }

    #[test]
    fn drift_reports_missing_root_then_nothing_after_pass() {
        let (mut engine, store, mut host) = fixture("charA");
        host.insert_item("chat1");

        assert_eq!(engine.drift(&host), Some(Drift::MissingRoot));
        engine.run_pass(&mut host, &store).unwrap();
        assert_eq!(engine.drift(&host), None);
    }

    #[test]
    fn drift_reports_duplicate_roots_and_loose_items() {
        let (mut engine, store, mut host) = fixture("charA");
        host.insert_item("chat1");
        engine.run_pass(&mut host, &store).unwrap();

        host.insert_item("chat2");
        assert_eq!(engine.drift(&host), Some(Drift::LooseItems(1)));
        engine.run_pass(&mut host, &store).unwrap();

        host.create_overlay_root();
        assert_eq!(engine.drift(&host), Some(Drift::DuplicateRoots(2)));
    }

    #[test]
    fn hook_runs_once_per_item_lifetime() {
        let (mut engine, store, mut host) = fixture("charA");
        host.insert_item("chat1");

        let seen: Rc<RefCell<Vec<ItemId>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        engine.set_item_hook(Box::new(move |_, _, item| {
            sink.borrow_mut().push(item.clone());
        }));

        engine.run_pass(&mut host, &store).unwrap();
        engine.run_pass(&mut host, &store).unwrap();
        assert_eq!(seen.borrow().len(), 1);

        // A host rebuild produces fresh nodes, so the hook re-runs.
        host.rebuild_region(["chat1"]);
        engine.run_pass(&mut host, &store).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }
}
