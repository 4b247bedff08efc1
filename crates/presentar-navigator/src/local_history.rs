//! Per-route local history.
//!
//! Components inside a route (a dropdown, a search field) register entries
//! that a back request removes one at a time before the route itself pops.
//! The route's [`LocalHistory`] owns the entries; whoever registered one keeps
//! only a [`LocalHistoryHandle`], a weak back-reference that goes inert once
//! the route is disposed.

use crate::route::RouteId;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type RemoveCallback = Box<dyn FnOnce()>;

/// An entry to register on a route.
#[derive(Default)]
pub struct LocalHistoryEntry {
    on_remove: Option<RemoveCallback>,
}

impl LocalHistoryEntry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback fired once when the entry is removed, by a pop or through
    /// its handle.
    #[must_use]
    pub fn with_on_remove(mut self, on_remove: impl FnOnce() + 'static) -> Self {
        self.on_remove = Some(Box::new(on_remove));
        self
    }
}

impl fmt::Debug for LocalHistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalHistoryEntry")
            .field("on_remove", &self.on_remove.is_some())
            .finish()
    }
}

struct Stored {
    id: u64,
    on_remove: Option<RemoveCallback>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Stored>,
}

impl Inner {
    fn take(&mut self, id: u64) -> Option<Stored> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }
}

/// Ordered local history of one route.
pub struct LocalHistory {
    route: RouteId,
    inner: Rc<RefCell<Inner>>,
}

impl LocalHistory {
    pub(crate) fn new(route: RouteId) -> Self {
        Self {
            route,
            inner: Rc::new(RefCell::new(Inner::default())),
        }
    }

    #[must_use]
    pub const fn route(&self) -> RouteId {
        self.route
    }

    /// Register an entry on top of the history.
    pub fn add(&self, entry: LocalHistoryEntry) -> LocalHistoryHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Stored {
            id,
            on_remove: entry.on_remove,
        });
        LocalHistoryHandle {
            id,
            route: self.route,
            history: Rc::downgrade(&self.inner),
        }
    }

    /// Remove the most recent entry and fire its callback.
    pub fn pop_last(&self) -> bool {
        let removed = self.inner.borrow_mut().entries.pop();
        match removed {
            Some(stored) => {
                // The borrow is released, so the callback may touch the history.
                if let Some(on_remove) = stored.on_remove {
                    on_remove();
                }
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop remaining entries without firing their callbacks and detach
    /// every outstanding handle.
    pub(crate) fn dispose(&mut self) {
        drop(std::mem::take(&mut self.inner));
    }
}

impl fmt::Debug for LocalHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalHistory")
            .field("route", &self.route)
            .field("len", &self.len())
            .finish()
    }
}

/// Capability of owning a local history.
pub trait HasLocalHistory {
    fn local_history(&self) -> &LocalHistory;

    /// Whether the next pop will be consumed by the history.
    fn will_handle_pop_internally(&self) -> bool {
        !self.local_history().is_empty()
    }

    fn add_local_history_entry(&self, entry: LocalHistoryEntry) -> LocalHistoryHandle {
        self.local_history().add(entry)
    }
}

impl HasLocalHistory for LocalHistory {
    fn local_history(&self) -> &LocalHistory {
        self
    }
}

/// Weak reference to an entry, held by whoever registered it.
#[derive(Debug, Clone)]
pub struct LocalHistoryHandle {
    id: u64,
    route: RouteId,
    history: Weak<RefCell<Inner>>,
}

impl LocalHistoryHandle {
    /// Route the entry was registered on.
    #[must_use]
    pub const fn route(&self) -> RouteId {
        self.route
    }

    /// Whether the entry is still registered.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        let Some(inner) = self.history.upgrade() else {
            return false;
        };
        let inner = inner.borrow();
        inner.entries.iter().any(|e| e.id == self.id)
    }

    /// Detach the entry and fire its callback.
    ///
    /// Returns `false` if the entry was already removed or the route has
    /// been disposed.
    pub fn remove(&self) -> bool {
        let Some(inner) = self.history.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().take(self.id);
        match removed {
            Some(stored) => {
                if let Some(on_remove) = stored.on_remove {
                    on_remove();
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> LocalHistoryEntry) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| {
            let sink = Rc::clone(&sink);
            LocalHistoryEntry::new().with_on_remove(move || sink.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_pop_last_is_lifo() {
        let (log, entry) = recorder();
        let history = LocalHistory::new(RouteId(0));
        history.add(entry("a"));
        history.add(entry("b"));
        assert!(history.will_handle_pop_internally());

        assert!(history.pop_last());
        assert!(history.pop_last());
        assert!(!history.pop_last());
        assert_eq!(*log.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn test_handle_remove_fires_once() {
        let (log, entry) = recorder();
        let history = LocalHistory::new(RouteId(0));
        let handle = history.add(entry("a"));
        assert!(handle.is_attached());

        assert!(handle.remove());
        assert!(!handle.remove());
        assert!(!handle.is_attached());
        assert!(history.is_empty());
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_handle_remove_after_pop_is_noop() {
        let (log, entry) = recorder();
        let history = LocalHistory::new(RouteId(0));
        let handle = history.add(entry("a"));
        history.pop_last();
        assert!(!handle.remove());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_remove_middle_entry_keeps_order() {
        let (log, entry) = recorder();
        let history = LocalHistory::new(RouteId(0));
        history.add(entry("a"));
        let middle = history.add(entry("b"));
        history.add(entry("c"));

        assert!(middle.remove());
        history.pop_last();
        history.pop_last();
        assert_eq!(*log.borrow(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_dispose_drops_entries_silently() {
        let (log, entry) = recorder();
        let mut history = LocalHistory::new(RouteId(4));
        let handle = history.add(entry("a"));
        history.dispose();

        assert!(history.is_empty());
        assert!(!handle.is_attached());
        assert!(!handle.remove());
        assert!(log.borrow().is_empty());
        assert_eq!(handle.route(), RouteId(4));
    }

    #[test]
    fn test_callback_may_register_new_entry() {
        let history = Rc::new(LocalHistory::new(RouteId(0)));
        let inner = Rc::clone(&history);
        history.add(LocalHistoryEntry::new().with_on_remove(move || {
            inner.add(LocalHistoryEntry::new());
        }));
        assert!(history.pop_last());
        assert_eq!(history.len(), 1);
    }
}
