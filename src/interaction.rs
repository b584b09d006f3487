//! Interaction-layer view models.
//!
//! The cosmetic controls (context menu, management panel) belong to the
//! host's UI toolkit; this module gives them data to render and appliers
//! to call, so the controls themselves stay free of grouping logic:
//!
//! - [`move_menu`] — the "move to folder" menu for one item, with the
//!   item's current location marked active;
//! - [`apply_move`] — applies a menu choice, including the
//!   create-and-move gesture behind a "New Folder..." entry;
//! - [`folder_panel`] — per-folder summaries for a management surface.
//!
//! Panel member counts come from store membership and may transiently
//! disagree with container badges, which always reflect rendered
//! children after a pass.

use crate::host::HostList;
use crate::id::{FolderId, ItemId};
use crate::notify::Notifier;
use crate::overlay::Overlay;
use crate::store::FolderColor;

/// A destination choice for one item.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveTarget {
    Folder(FolderId),
    Ungrouped,
    /// Create a folder with this name, then move the item into it.
    NewFolder { name: String },
}

/// One row of the move menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntry {
    pub label: String,
    pub target: MoveTarget,
    /// Whether this row is the item's current location.
    pub active: bool,
}

/// The "move to folder" menu for one item: every folder in scope order,
/// then the ungrouped row. The host renders its own trailing "New
/// Folder..." affordance and feeds the typed name back through
/// [`MoveTarget::NewFolder`].
#[derive(Debug, Clone, PartialEq)]
pub struct MoveMenu {
    pub entries: Vec<MoveEntry>,
}

/// Build the move menu for `item`. `None` when no scope is active.
pub fn move_menu<H: HostList>(overlay: &Overlay<H>, item: &ItemId) -> Option<MoveMenu> {
    let scope = overlay.active_scope()?;
    let current = overlay.store().folder_for_item(item);

    let mut entries: Vec<MoveEntry> = overlay
        .store()
        .folders_for_scope(&scope)
        .into_iter()
        .map(|view| MoveEntry {
            label: view.name,
            active: current.as_ref() == Some(&view.id),
            target: MoveTarget::Folder(view.id),
        })
        .collect();

    entries.push(MoveEntry {
        label: crate::engine::UNGROUPED_LABEL.to_string(),
        target: MoveTarget::Ungrouped,
        active: current.is_none(),
    });

    Some(MoveMenu { entries })
}

/// Apply a move-menu choice. Returns whether a move happened; a failed
/// folder creation (no scope, blank name) reports through `notifier`
/// and leaves the item where it was.
pub fn apply_move<H: HostList>(
    overlay: &mut Overlay<H>,
    item: &ItemId,
    target: MoveTarget,
    notifier: &mut dyn Notifier,
) -> bool {
    match target {
        MoveTarget::Folder(id) => {
            overlay.move_item(item, Some(&id));
            true
        }
        MoveTarget::Ungrouped => {
            overlay.move_item(item, None);
            true
        }
        MoveTarget::NewFolder { name } => match overlay.create_folder(&name, notifier) {
            Some(id) => {
                overlay.move_item(item, Some(&id));
                true
            }
            None => false,
        },
    }
}

/// One folder's row in the management panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderSummary {
    pub id: FolderId,
    pub name: String,
    /// Store membership count (may lag rendered counts).
    pub members: usize,
    pub collapsed: bool,
    pub color: Option<FolderColor>,
}

/// Folder summaries for the management panel, in display order.
/// `None` when no scope is active (the host should prompt for a
/// conversation first).
pub fn folder_panel<H: HostList>(overlay: &Overlay<H>) -> Option<Vec<FolderSummary>> {
    let scope = overlay.active_scope()?;
    Some(
        overlay
            .store()
            .folders_for_scope(&scope)
            .into_iter()
            .map(|view| FolderSummary {
                id: view.id,
                name: view.name,
                members: view.member_ids.len(),
                collapsed: view.collapsed,
                color: view.color,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::host::FakeHost;
    use crate::notify::MockNotifier;
    use crate::scope::CurrentScope;
    use crate::settings::MemorySettings;

    fn overlay_with_scope(scope: &str) -> Overlay<FakeHost> {
        let settings = Rc::new(RefCell::new(MemorySettings::new()));
        let resolver = Rc::new(CurrentScope::selected(scope));
        Overlay::new(FakeHost::new(), settings, resolver)
    }

    #[test]
    fn menu_marks_current_folder_active() {
        let mut overlay = overlay_with_scope("charA");
        let mut notifier = MockNotifier::new();
        let f = overlay.create_folder("F", &mut notifier).unwrap();
        overlay.create_folder("G", &mut notifier).unwrap();
        let item = ItemId::from("chat1");
        overlay.move_item(&item, Some(&f));

        let menu = move_menu(&overlay, &item).unwrap();
        assert_eq!(menu.entries.len(), 3);
        assert!(menu.entries[0].active); // F
        assert!(!menu.entries[1].active); // G
        assert!(!menu.entries[2].active); // Ungrouped
    }

    #[test]
    fn menu_marks_ungrouped_for_unassigned_item() {
        let mut overlay = overlay_with_scope("charA");
        let mut notifier = MockNotifier::new();
        overlay.create_folder("F", &mut notifier).unwrap();

        let menu = move_menu(&overlay, &ItemId::from("chat9")).unwrap();
        assert!(menu.entries.last().unwrap().active);
    }

    #[test]
    fn menu_requires_active_scope() {
        let settings = Rc::new(RefCell::new(MemorySettings::new()));
        let resolver = Rc::new(CurrentScope::new());
        let overlay = Overlay::new(FakeHost::new(), settings, resolver);

        assert!(move_menu(&overlay, &ItemId::from("chat1")).is_none());
        assert!(folder_panel(&overlay).is_none());
    }

    #[test]
    fn new_folder_gesture_creates_and_moves() {
        let mut overlay = overlay_with_scope("charA");
        let mut notifier = MockNotifier::new();
        let item = ItemId::from("chat1");

        let moved = apply_move(
            &mut overlay,
            &item,
            MoveTarget::NewFolder {
                name: "Fresh".into(),
            },
            &mut notifier,
        );

        assert!(moved);
        let assigned = overlay.store().folder_for_item(&item).unwrap();
        assert_eq!(overlay.store().folder(&assigned).unwrap().name, "Fresh");
    }

    #[test]
    fn new_folder_gesture_with_blank_name_moves_nothing() {
        let mut overlay = overlay_with_scope("charA");
        let mut notifier = MockNotifier::new();
        let item = ItemId::from("chat1");

        let moved = apply_move(
            &mut overlay,
            &item,
            MoveTarget::NewFolder { name: "  ".into() },
            &mut notifier,
        );

        assert!(!moved);
        assert!(overlay.store().folder_for_item(&item).is_none());
        assert_eq!(notifier.warnings().len(), 1);
    }

    #[test]
    fn panel_reports_membership_counts() {
        let mut overlay = overlay_with_scope("charA");
        let mut notifier = MockNotifier::new();
        let f = overlay.create_folder("F", &mut notifier).unwrap();
        overlay.move_item(&ItemId::from("chat1"), Some(&f));
        overlay.move_item(&ItemId::from("chat2"), Some(&f));

        let panel = folder_panel(&overlay).unwrap();
        assert_eq!(panel.len(), 1);
        assert_eq!(panel[0].members, 2);
        assert_eq!(panel[0].name, "F");
    }
}
