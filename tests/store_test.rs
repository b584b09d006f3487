//! Grouping store integration tests: persistence, migration, and the
//! debounced flush path, including the file-backed settings store.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use tempfile::TempDir;

use corral::host::FakeHost;
use corral::id::ItemId;
use corral::notify::MockNotifier;
use corral::overlay::Overlay;
use corral::scope::CurrentScope;
use corral::settings::{FileSettings, MemorySettings, SettingsStore};
use corral::store::{
    FolderColor, GroupingStore, FLUSH_DEBOUNCE, SCHEMA_VERSION, SETTINGS_KEY,
};

#[test]
fn layout_survives_settings_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");

    let resolver = Rc::new(CurrentScope::selected("charA"));
    let folder = {
        let settings = Rc::new(RefCell::new(FileSettings::open(&path).unwrap()));
        let mut overlay = Overlay::new(FakeHost::new(), settings.clone(), resolver.clone());
        let mut notifier = MockNotifier::new();

        let folder = overlay.create_folder("Keepers", &mut notifier).unwrap();
        overlay.set_color(&folder, Some(FolderColor::uniform("#306998")));
        overlay.move_item(&ItemId::from("chat1"), Some(&folder));

        // The debounced flush persists everything to disk.
        overlay.advance(FLUSH_DEBOUNCE);
        assert!(!settings.borrow().dirty());
        folder
    };

    // A fresh process: reload from the same file.
    let settings = Rc::new(RefCell::new(FileSettings::open(&path).unwrap()));
    let store = GroupingStore::new(settings, resolver);

    let view = store.folder(&folder).expect("folder persisted");
    assert_eq!(view.name, "Keepers");
    assert_eq!(view.color, Some(FolderColor::uniform("#306998")));
    assert_eq!(view.member_ids, vec![ItemId::from("chat1")]);
    assert_eq!(store.folder_for_item(&ItemId::from("chat1")), Some(folder));
}

#[test]
fn mutation_burst_flushes_once() {
    let settings = Rc::new(RefCell::new(MemorySettings::new()));
    let resolver = Rc::new(CurrentScope::selected("charA"));
    let mut overlay = Overlay::new(FakeHost::new(), settings.clone(), resolver);
    let mut notifier = MockNotifier::new();

    let f = overlay.create_folder("F", &mut notifier).unwrap();
    overlay.rename_folder(&f, "F2", &mut notifier);
    overlay.set_collapsed(&f, true);
    overlay.move_item(&ItemId::from("chat1"), Some(&f));

    assert_eq!(settings.borrow().flush_count(), 0);
    overlay.advance(FLUSH_DEBOUNCE);
    assert_eq!(settings.borrow().flush_count(), 1);

    // Nothing further scheduled once clean.
    overlay.advance(FLUSH_DEBOUNCE * 10);
    assert_eq!(settings.borrow().flush_count(), 1);
}

#[test]
fn partial_blob_gains_defaults_on_load() {
    // A blob written by an older build: no ownerScopes, no schemaVersion,
    // folder records missing most fields.
    let blob = json!({
        "folders": {
            "folder_1700000000000_00000000000000aa": { "name": "Old" }
        }
    });
    let settings = Rc::new(RefCell::new(MemorySettings::seeded(SETTINGS_KEY, blob)));
    let resolver = Rc::new(CurrentScope::selected("charA"));
    let store = GroupingStore::new(settings, resolver);

    let layout = store.layout();
    assert_eq!(layout.schema_version, SCHEMA_VERSION);
    assert!(layout.owner_scopes.is_empty());
    assert_eq!(layout.folders.len(), 1);

    let record = layout.folders.values().next().unwrap();
    assert_eq!(record.name, "Old");
    assert!(record.member_ids.is_empty());
    assert!(!record.collapsed);
    assert!(record.color.is_none());
}

#[test]
fn corrupt_blob_degrades_to_empty_layout() {
    let settings = Rc::new(RefCell::new(MemorySettings::seeded(
        SETTINGS_KEY,
        json!(["not", "an", "object"]),
    )));
    let resolver = Rc::new(CurrentScope::selected("charA"));
    let mut store = GroupingStore::new(settings, resolver);

    assert!(store.layout().folders.is_empty());

    // The store stays usable: the next mutation rewrites a clean blob.
    let scope = "charA".into();
    let id = store.create_folder(&scope, "Fresh", 0);
    assert_eq!(store.folder(&id).unwrap().name, "Fresh");
}

#[test]
fn move_semantics_hold_across_store_reloads() {
    let settings = Rc::new(RefCell::new(MemorySettings::new()));
    let resolver = Rc::new(CurrentScope::selected("charA"));
    let scope = "charA".into();

    let mut store = GroupingStore::new(settings.clone(), resolver.clone());
    let f = store.create_folder(&scope, "F", 0);
    let g = store.create_folder(&scope, "G", 0);
    let item = ItemId::from("chat1");
    store.move_item(&item, Some(&f), 0);
    store.move_item(&item, Some(&g), 0);

    // A second store over the same settings derives the same answer:
    // there is no cached state to go stale.
    let other = GroupingStore::new(settings, resolver);
    assert_eq!(other.folder_for_item(&item), Some(g));
    assert!(other.folder(&f).unwrap().member_ids.is_empty());
}

#[test]
fn deleting_persists_no_uncategorized_record() {
    let settings = Rc::new(RefCell::new(MemorySettings::new()));
    let resolver = Rc::new(CurrentScope::selected("charA"));
    let scope = "charA".into();
    let mut store = GroupingStore::new(settings.clone(), resolver);

    let f = store.create_folder(&scope, "F", 0);
    store.move_item(&ItemId::from("chat1"), Some(&f), 0);
    store.delete_folder(&f, 0);

    // Ungrouped stays virtual: the blob holds no folder records at all
    // and no membership for the orphaned item.
    let blob = settings.borrow().get(SETTINGS_KEY).unwrap();
    assert_eq!(blob["folders"], json!({}));
    assert_eq!(blob["ownerScopes"]["charA"], json!([]));
}
