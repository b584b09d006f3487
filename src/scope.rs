//! Active-owner resolution.
//!
//! Folders and memberships are namespaced by an owner scope (the selected
//! conversation partner in the host). The host decides which scope is
//! current; this crate only asks. [`ScopeResolver`] is the seam, and
//! [`CurrentScope`] is a ready-made resolver backed by a cell the embedder
//! updates from its own selection-changed events.

use std::cell::RefCell;

use crate::id::ScopeId;

/// Resolves the currently-active owner scope, if any.
pub trait ScopeResolver {
    /// The scope id that namespaces store operations right now, or `None`
    /// when no owner is selected.
    fn active_scope(&self) -> Option<ScopeId>;
}

/// A [`ScopeResolver`] backed by a mutable cell.
///
/// The embedder keeps one of these, shares it with the overlay, and calls
/// [`CurrentScope::select`] whenever the host switches conversations.
#[derive(Debug, Default)]
pub struct CurrentScope {
    scope: RefCell<Option<ScopeId>>,
}

impl CurrentScope {
    /// Create a resolver with no scope selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with `scope` already selected.
    pub fn selected(scope: impl Into<ScopeId>) -> Self {
        let current = Self::new();
        current.select(Some(scope.into()));
        current
    }

    /// Change the active scope (`None` deselects).
    pub fn select(&self, scope: Option<ScopeId>) {
        *self.scope.borrow_mut() = scope;
    }
}

impl ScopeResolver for CurrentScope {
    fn active_scope(&self) -> Option<ScopeId> {
        self.scope.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unresolved() {
        let current = CurrentScope::new();
        assert!(current.active_scope().is_none());
    }

    #[test]
    fn select_and_deselect() {
        let current = CurrentScope::new();
        current.select(Some(ScopeId::from("charA")));
        assert_eq!(current.active_scope(), Some(ScopeId::from("charA")));

        current.select(None);
        assert!(current.active_scope().is_none());
    }

    #[test]
    fn selected_constructor() {
        let current = CurrentScope::selected("charB");
        assert_eq!(current.active_scope(), Some(ScopeId::from("charB")));
    }
}
