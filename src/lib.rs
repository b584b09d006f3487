//! Corral - folder grouping overlay for host-rendered conversation lists.
//!
//! Corral partitions a host application's asynchronously-rendered,
//! per-owner list into user-defined, named, collapsible folders,
//! persisted per owning context. The host keeps full ownership of the
//! items; corral only re-parents them into engine-owned containers and
//! heals whatever structure the host's own re-renders knock over.
//!
//! # Modules
//!
//! - [`detect`] - Change detection, debouncing, and the fallback drift check
//! - [`engine`] - The reconciliation engine and pass reports
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host list-view adapter trait and the in-memory fake
//! - [`id`] - Folder, item, and scope identifiers
//! - [`interaction`] - Menu and panel view models for the host's controls
//! - [`notify`] - Transient user-notice seam
//! - [`overlay`] - The facade wiring store, engine, and detector together
//! - [`schedule`] - Cooperative time and the single-slot debounce
//! - [`scope`] - Active-owner resolution
//! - [`settings`] - Persisted-settings collaborator (memory and file backed)
//! - [`store`] - The persisted grouping store and layout blob
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use corral::host::FakeHost;
//! use corral::notify::MockNotifier;
//! use corral::overlay::Overlay;
//! use corral::scope::CurrentScope;
//! use corral::settings::MemorySettings;
//!
//! let settings = Rc::new(RefCell::new(MemorySettings::new()));
//! let resolver = Rc::new(CurrentScope::selected("charA"));
//! let host = FakeHost::with_items(["chat1", "chat2"]);
//!
//! let mut overlay = Overlay::new(host, settings, resolver);
//! let mut notifier = MockNotifier::new();
//!
//! let folder = overlay.create_folder("Favorites", &mut notifier).unwrap();
//! overlay.move_item(&"chat1".into(), Some(&folder));
//!
//! // chat1 sits in Favorites, chat2 in the ungrouped container.
//! let report = overlay.refresh();
//! assert_eq!(report.relocations, 0); // already at the fixed point
//! ```

pub mod detect;
pub mod engine;
pub mod error;
pub mod host;
pub mod id;
pub mod interaction;
pub mod notify;
pub mod overlay;
pub mod schedule;
pub mod scope;
pub mod settings;
pub mod store;

pub use error::{CorralError, Result};
