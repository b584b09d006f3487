//! The overlay facade.
//!
//! [`Overlay`] wires the grouping store, reconciliation engine and
//! change detector over one host region and exposes the operations the
//! interaction layer calls: folder mutators, `refresh`, the host's
//! change notifications, and the cooperative timeline.
//!
//! The embedder drives time explicitly: hook `handle_region_change`
//! into the host's mutation notifications and call `advance(now)` from
//! whatever timer the host provides. Work runs to completion inside
//! those calls; there are no threads and no async runtime.
//!
//! Pass failures stop here. A missing host anchor aborts the pass with
//! a debug log and the next trigger retries from scratch; callers never
//! see an error from `refresh`.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::detect::{ChangeDetector, PassTrigger};
use crate::engine::{ItemHook, PassOutcome, PassReport, ReconciliationEngine};
use crate::error::{CorralError, Result};
use crate::host::{HostList, RegionChange};
use crate::id::{FolderId, ItemId, ScopeId};
use crate::notify::Notifier;
use crate::schedule::Tick;
use crate::scope::ScopeResolver;
use crate::settings::SettingsStore;
use crate::store::{normalize_folder_name, FolderColor, GroupingStore};

/// Folder grouping overlay over one host list region.
pub struct Overlay<H: HostList> {
    host: H,
    store: GroupingStore,
    engine: ReconciliationEngine,
    detector: ChangeDetector,
    resolver: Rc<dyn ScopeResolver>,
    now: Tick,
}

impl<H: HostList> Overlay<H> {
    /// Build an overlay over `host`, persisting through `settings` and
    /// resolving the active owner through `resolver`.
    pub fn new(
        host: H,
        settings: Rc<RefCell<dyn SettingsStore>>,
        resolver: Rc<dyn ScopeResolver>,
    ) -> Self {
        Self {
            host,
            store: GroupingStore::new(settings, resolver.clone()),
            engine: ReconciliationEngine::new(resolver.clone()),
            detector: ChangeDetector::new(0),
            resolver,
            now: 0,
        }
    }

    /// Install the per-item interaction hook (see
    /// [`ReconciliationEngine::set_item_hook`]).
    pub fn set_item_hook(&mut self, hook: ItemHook) {
        self.engine.set_item_hook(hook);
    }

    /// The host adapter (assertion helpers live on concrete hosts).
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, for the embedder's own renderer events.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The grouping store (read access for view models).
    pub fn store(&self) -> &GroupingStore {
        &self.store
    }

    /// The currently-active owner scope.
    pub fn active_scope(&self) -> Option<ScopeId> {
        self.resolver.active_scope()
    }

    /// Current cooperative time.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Passes that ran to completion so far.
    pub fn completed_passes(&self) -> u64 {
        self.engine.completed_passes()
    }

    // --- Triggers ---

    /// Feed one change notification from the host's list region.
    pub fn handle_region_change(&mut self, change: RegionChange) {
        self.detector
            .observe(&change, self.engine.in_pass(), self.now);
    }

    /// Advance the cooperative timeline, firing any due work: settings
    /// flushes, the debounced pass, and the fallback drift check.
    pub fn advance(&mut self, now: Tick) {
        self.now = self.now.max(now);
        self.store.tick(self.now);

        while let Some(trigger) = self.detector.poll(self.now) {
            match trigger {
                PassTrigger::Debounced => {
                    self.run_pass();
                }
                PassTrigger::Fallback => {
                    if let Some(drift) = self.engine.drift(&self.host) {
                        debug!(?drift, "Fallback check found drift, forcing pass");
                        self.run_pass();
                    }
                }
            }
        }
    }

    /// Force an immediate reconciliation pass.
    pub fn refresh(&mut self) -> PassReport {
        self.run_pass()
    }

    fn run_pass(&mut self) -> PassReport {
        match self.engine.run_pass(&mut self.host, &self.store) {
            Ok(report) => report,
            Err(e) => {
                // Host markup is outside our control; retried next trigger.
                debug!("Reconciliation pass aborted: {e}");
                PassReport::skipped(PassOutcome::Aborted)
            }
        }
    }

    // --- Folder operations ---

    /// Create a folder in the active scope and refresh.
    ///
    /// No active scope or a blank name aborts with a transient warning
    /// and no state mutation.
    pub fn create_folder(&mut self, name: &str, notifier: &mut dyn Notifier) -> Option<FolderId> {
        match self.try_create_folder(name) {
            Ok(id) => {
                self.refresh();
                Some(id)
            }
            Err(e) => {
                notifier.warning(&e.to_string());
                None
            }
        }
    }

    fn try_create_folder(&mut self, name: &str) -> Result<FolderId> {
        let scope = self.resolver.active_scope().ok_or(CorralError::NoActiveScope)?;
        let name = normalize_folder_name(name).ok_or(CorralError::BlankFolderName)?;
        Ok(self.store.create_folder(&scope, &name, self.now))
    }

    /// Rename a folder and refresh. Blank names abort with a warning.
    pub fn rename_folder(&mut self, id: &FolderId, name: &str, notifier: &mut dyn Notifier) {
        let Some(name) = normalize_folder_name(name) else {
            notifier.warning(&CorralError::BlankFolderName.to_string());
            return;
        };
        self.store.rename_folder(id, &name, self.now);
        self.refresh();
    }

    /// Delete a folder and refresh; its items fall back to ungrouped.
    pub fn delete_folder(&mut self, id: &FolderId) {
        self.store.delete_folder(id, self.now);
        self.refresh();
    }

    /// Set a folder's collapsed state and refresh.
    pub fn set_collapsed(&mut self, id: &FolderId, collapsed: bool) {
        self.store.set_collapsed(id, collapsed, self.now);
        self.refresh();
    }

    /// Flip a folder's collapsed state and refresh.
    pub fn toggle_collapsed(&mut self, id: &FolderId) {
        if let Some(view) = self.store.folder(id) {
            self.store.set_collapsed(id, !view.collapsed, self.now);
            self.refresh();
        }
    }

    /// Set or clear a folder's color and refresh.
    pub fn set_color(&mut self, id: &FolderId, color: Option<FolderColor>) {
        self.store.set_color(id, color, self.now);
        self.refresh();
    }

    /// Move an item to a folder (`None` ungroups it) and refresh.
    pub fn move_item(&mut self, item: &ItemId, target: Option<&FolderId>) {
        self.store.move_item(item, target, self.now);
        self.refresh();
    }
}
