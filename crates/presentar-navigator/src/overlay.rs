//! Ordered presentation entries, bottom to top.
//!
//! Each route contributes the entries its renderer draws: a page one content
//! entry, a popup a modal barrier plus its content. Routes that left the stack
//! keep their entries until they are disposed so that exits stay visible.

use crate::route::{RouteId, RouteKind};
use std::fmt;

/// Identity of an overlay entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayEntryId(u64);

impl fmt::Display for OverlayEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// What an entry draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    /// Modal barrier behind a popup.
    Barrier,
    /// The route's own content.
    Content,
}

/// One presentation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEntry {
    pub id: OverlayEntryId,
    pub route: RouteId,
    pub role: EntryRole,
    /// Hides everything below it.
    pub opaque: bool,
    /// Keep building while hidden.
    pub maintain_state: bool,
}

/// Entries of every rendering route.
#[derive(Debug, Default)]
pub struct Overlay {
    entries: Vec<OverlayEntry>,
    next_id: u64,
}

impl Overlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entries for `route`, directly above the entries of `above`
    /// or on top when `above` is `None` or has no entries.
    pub(crate) fn insert(&mut self, route: RouteId, kind: RouteKind, above: Option<RouteId>) -> Vec<OverlayEntryId> {
        let roles: &[EntryRole] = match kind {
            RouteKind::Page { .. } => &[EntryRole::Content],
            RouteKind::Popup { .. } => &[EntryRole::Barrier, EntryRole::Content],
            RouteKind::Plain => &[],
        };
        let at = above
            .and_then(|anchor| self.entries.iter().rposition(|e| e.route == anchor))
            .map_or(self.entries.len(), |index| index + 1);

        let created: Vec<OverlayEntry> = roles
            .iter()
            .map(|&role| {
                let id = OverlayEntryId(self.next_id);
                self.next_id += 1;
                OverlayEntry {
                    id,
                    route,
                    role,
                    opaque: false,
                    maintain_state: kind.maintain_state(),
                }
            })
            .collect();
        let ids = created.iter().map(|e| e.id).collect();
        for (offset, entry) in created.into_iter().enumerate() {
            self.entries.insert(at + offset, entry);
        }
        ids
    }

    /// Remove every entry of `route`. Returns how many were removed.
    pub(crate) fn remove_route(&mut self, route: RouteId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.route != route);
        before - self.entries.len()
    }

    /// Recompute the opacity of every content entry in one pass. Entries of
    /// routes for which `opaque` returns `None` keep their opacity.
    pub(crate) fn sync_opacity(&mut self, mut opaque: impl FnMut(RouteId) -> Option<bool>) {
        for entry in &mut self.entries {
            if entry.role != EntryRole::Content {
                continue;
            }
            if let Some(value) = opaque(entry.route) {
                entry.opaque = value;
            }
        }
    }

    /// All entries, bottom to top.
    #[must_use]
    pub fn entries(&self) -> &[OverlayEntry] {
        &self.entries
    }

    /// Entries of one route.
    pub fn entries_for(&self, route: RouteId) -> impl Iterator<Item = &OverlayEntry> {
        self.entries.iter().filter(move |e| e.route == route)
    }

    /// Entries that are drawn: everything from the topmost opaque entry up,
    /// bottom to top.
    #[must_use]
    pub fn visible(&self) -> Vec<&OverlayEntry> {
        let start = self.entries.iter().rposition(|e| e.opaque).unwrap_or(0);
        self.entries[start..].iter().collect()
    }

    /// Hidden entries that keep their state, bottom to top.
    #[must_use]
    pub fn offstage(&self) -> Vec<&OverlayEntry> {
        let start = self.entries.iter().rposition(|e| e.opaque).unwrap_or(0);
        self.entries[..start].iter().filter(|e| e.maintain_state).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
