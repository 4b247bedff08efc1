//! Route model: identity, kinds, lifecycle and the hooks a route implements.
//!
//! A route is composed from small capability traits rather than a class
//! hierarchy:
//! - [`Installable`]: set up and torn down exactly once
//! - [`Poppable`]: answers back-navigation and receives its result
//! - [`Route`]: settings, [`RouteKind`] and neighbour notifications
//! - [`Animated`]: exposes primary and secondary animations
//!
//! Kind-specific behaviour (pages vs. popups vs. plain routes) is tagged data
//! on [`RouteKind`].

use crate::settings::RouteSettings;
use crate::transition::TransitionSpec;
use presentar_animation::AnimationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity of a route inside one navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) u64);

impl RouteId {
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// Presentation kind of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteKind {
    /// Full-screen page. Opaque once its entrance completes.
    Page {
        /// Keep the page's content alive while covered by an opaque route.
        maintain_state: bool,
        /// Enters as a dialog; pages below do not transition to it.
        fullscreen_dialog: bool,
    },
    /// Route drawn over the previous one behind a modal barrier.
    Popup {
        /// Tapping the barrier pops the route.
        barrier_dismissible: bool,
    },
    /// No transition and no overlay entries.
    Plain,
}

impl Default for RouteKind {
    fn default() -> Self {
        Self::page()
    }
}

impl RouteKind {
    #[must_use]
    pub const fn page() -> Self {
        Self::Page {
            maintain_state: true,
            fullscreen_dialog: false,
        }
    }

    #[must_use]
    pub const fn fullscreen_dialog() -> Self {
        Self::Page {
            maintain_state: true,
            fullscreen_dialog: true,
        }
    }

    #[must_use]
    pub const fn popup() -> Self {
        Self::Popup {
            barrier_dismissible: true,
        }
    }

    #[must_use]
    pub const fn is_page(self) -> bool {
        matches!(self, Self::Page { .. })
    }

    #[must_use]
    pub const fn is_popup(self) -> bool {
        matches!(self, Self::Popup { .. })
    }

    /// Pages and popups animate; plain routes do not.
    #[must_use]
    pub const fn has_transition(self) -> bool {
        !matches!(self, Self::Plain)
    }

    #[must_use]
    pub const fn maintain_state(self) -> bool {
        match self {
            Self::Page { maintain_state, .. } => maintain_state,
            Self::Popup { .. } => true,
            Self::Plain => false,
        }
    }

    #[must_use]
    pub const fn barrier_dismissible(self) -> bool {
        matches!(
            self,
            Self::Popup {
                barrier_dismissible: true
            }
        )
    }
}

/// Snapshot of a route handed to hooks, observers and predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub id: RouteId,
    pub settings: RouteSettings,
    pub kind: RouteKind,
    pub primary: Option<AnimationId>,
    pub secondary: Option<AnimationId>,
}

impl RouteInfo {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.settings.name()
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Answer to a back-navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopDisposition {
    /// Pop the route.
    Pop,
    /// Swallow the request.
    DoNotPop,
    /// Hand the request to the enclosing navigator or platform.
    Bubble,
}

/// Result of [`Navigator::pop`](crate::Navigator::pop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    /// The route left the stack and is running its exit.
    Popped(RouteId),
    /// The route consumed the pop without leaving the stack.
    HandledInternally(RouteId),
}

impl PopOutcome {
    #[must_use]
    pub const fn route(self) -> RouteId {
        match self {
            Self::Popped(id) | Self::HandledInternally(id) => id,
        }
    }

    #[must_use]
    pub const fn left_stack(self) -> bool {
        matches!(self, Self::Popped(_))
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// Set-up and tear-down, each called exactly once.
pub trait Installable {
    /// Called before the route is placed on the stack and before any
    /// animation starts.
    fn install(&mut self, _info: &RouteInfo) {}

    /// Called once the route has left the navigator for good.
    fn dispose(&mut self, _info: &RouteInfo) {}
}

/// Back-navigation.
pub trait Poppable {
    /// Whether a back request should pop this route. Local history is
    /// consulted by the navigator before this is asked.
    fn will_pop(&self, _info: &RouteInfo, is_first: bool) -> PopDisposition {
        if is_first {
            PopDisposition::Bubble
        } else {
            PopDisposition::Pop
        }
    }

    /// The route is being popped with `result`. Returning `false` keeps it
    /// on the stack.
    fn did_pop(&mut self, _info: &RouteInfo, _result: Option<&Value>) -> bool {
        true
    }

    /// The route's completion is about to resolve with `result`.
    fn did_complete(&mut self, _info: &RouteInfo, _result: Option<&Value>) {}
}

/// Access to a route's animations.
pub trait Animated {
    /// Animation driving the route's own entrance and exit.
    fn primary_animation(&self) -> Option<AnimationId>;

    /// Animation following the route above.
    fn secondary_animation(&self) -> Option<AnimationId>;
}

impl Animated for RouteInfo {
    fn primary_animation(&self) -> Option<AnimationId> {
        self.primary
    }

    fn secondary_animation(&self) -> Option<AnimationId> {
        self.secondary
    }
}

/// A navigable unit owned by a [`Navigator`](crate::Navigator).
///
/// Every hook receives a snapshot of the route itself; the navigator runs the
/// matching animation work before calling it.
pub trait Route: Installable + Poppable {
    fn settings(&self) -> &RouteSettings;

    fn kind(&self) -> RouteKind;

    /// Transition override; the navigator config supplies one otherwise.
    fn transition(&self) -> Option<TransitionSpec> {
        None
    }

    /// Placed on the stack without an entrance animation.
    fn did_add(&mut self, _info: &RouteInfo) {}

    /// Pushed; the entrance animation has started.
    fn did_push(&mut self, _info: &RouteInfo) {}

    /// Took the place of `old`.
    fn did_replace(&mut self, _info: &RouteInfo, _old: Option<&RouteInfo>) {}

    /// The route above changed.
    fn did_change_next(&mut self, _info: &RouteInfo, _next: Option<&RouteInfo>) {}

    /// The route below changed.
    fn did_change_previous(&mut self, _info: &RouteInfo, _previous: Option<&RouteInfo>) {}

    /// The route above was popped and is running its exit.
    fn did_pop_next(&mut self, _info: &RouteInfo, _popped: &RouteInfo) {}

    /// Whether the secondary animation may follow `next`.
    fn can_transition_to(&self, next: &RouteInfo) -> bool {
        match self.kind() {
            RouteKind::Page { .. } => matches!(
                next.kind,
                RouteKind::Page {
                    fullscreen_dialog: false,
                    ..
                }
            ),
            _ => true,
        }
    }

    /// Whether `previous` may follow this route's primary animation.
    fn can_transition_from(&self, previous: &RouteInfo) -> bool {
        match self.kind() {
            RouteKind::Page { .. } => previous.kind.is_page(),
            _ => true,
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle of a route inside the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteLifecycle {
    Uninstalled,
    Installed,
    /// On the stack.
    Active,
    /// Left the stack; still rendering its exit.
    PoppedPending,
    Disposed,
}

impl RouteLifecycle {
    /// Whether moving to `next` is legal.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Uninstalled, Self::Installed)
                | (Self::Installed, Self::Active)
                | (Self::Active, Self::PoppedPending | Self::Disposed)
                | (Self::PoppedPending, Self::Disposed)
        )
    }

    /// Move to `next`.
    ///
    /// # Panics
    ///
    /// Panics on an illegal transition, such as disposing twice. These
    /// indicate a stack bookkeeping bug and are not recoverable.
    pub fn advance(&mut self, next: Self) {
        assert!(
            self.can_advance_to(next),
            "illegal route lifecycle transition {self:?} -> {next:?}"
        );
        *self = next;
    }

    #[must_use]
    pub const fn is_disposed(self) -> bool {
        matches!(self, Self::Disposed)
    }
}

// =============================================================================
// BasicRoute
// =============================================================================

/// Ready-made route with no behaviour of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicRoute {
    settings: RouteSettings,
    kind: RouteKind,
    transition: Option<TransitionSpec>,
}

impl BasicRoute {
    #[must_use]
    pub fn new(settings: RouteSettings, kind: RouteKind) -> Self {
        Self {
            settings,
            kind,
            transition: None,
        }
    }

    #[must_use]
    pub fn page(settings: RouteSettings) -> Self {
        Self::new(settings, RouteKind::page())
    }

    #[must_use]
    pub fn popup(settings: RouteSettings) -> Self {
        Self::new(settings, RouteKind::popup())
    }

    #[must_use]
    pub fn plain(settings: RouteSettings) -> Self {
        Self::new(settings, RouteKind::Plain)
    }

    #[must_use]
    pub fn with_transition(mut self, transition: TransitionSpec) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Box for handing to the navigator.
    #[must_use]
    pub fn boxed(self) -> Box<dyn Route> {
        Box::new(self)
    }
}

impl Installable for BasicRoute {}

impl Poppable for BasicRoute {}

impl Route for BasicRoute {
    fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    fn kind(&self) -> RouteKind {
        self.kind
    }

    fn transition(&self) -> Option<TransitionSpec> {
        self.transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: RouteKind) -> RouteInfo {
        RouteInfo {
            id: RouteId(1),
            settings: RouteSettings::named("/x"),
            kind,
            primary: None,
            secondary: None,
        }
    }

    #[test]
    fn test_route_id_display() {
        assert_eq!(RouteId(12).to_string(), "route#12");
        assert_eq!(info(RouteKind::page()).to_string(), "route#1 (/x)");
    }

    #[test]
    fn test_kind_capabilities() {
        assert!(RouteKind::page().has_transition());
        assert!(RouteKind::popup().has_transition());
        assert!(!RouteKind::Plain.has_transition());
        assert!(RouteKind::popup().barrier_dismissible());
        assert!(!RouteKind::Popup {
            barrier_dismissible: false
        }
        .barrier_dismissible());
        assert!(RouteKind::popup().maintain_state());
        assert!(!RouteKind::Page {
            maintain_state: false,
            fullscreen_dialog: false
        }
        .maintain_state());
    }

    #[test]
    fn test_kind_serde_tagged() {
        let json = serde_json::to_string(&RouteKind::popup()).unwrap();
        assert_eq!(json, r#"{"type":"popup","barrier_dismissible":true}"#);
        let parsed: RouteKind = serde_json::from_str(r#"{"type":"plain"}"#).unwrap();
        assert_eq!(parsed, RouteKind::Plain);
    }

    #[test]
    fn test_page_transitions_only_between_pages() {
        let page = BasicRoute::page(RouteSettings::named("/"));
        assert!(page.can_transition_to(&info(RouteKind::page())));
        assert!(!page.can_transition_to(&info(RouteKind::popup())));
        assert!(!page.can_transition_to(&info(RouteKind::fullscreen_dialog())));
        assert!(page.can_transition_from(&info(RouteKind::page())));
        assert!(!page.can_transition_from(&info(RouteKind::Plain)));

        let popup = BasicRoute::popup(RouteSettings::named("/menu"));
        assert!(popup.can_transition_to(&info(RouteKind::Plain)));
        assert!(popup.can_transition_from(&info(RouteKind::popup())));
    }

    #[test]
    fn test_default_will_pop() {
        let route = BasicRoute::page(RouteSettings::new());
        let me = info(RouteKind::page());
        assert_eq!(route.will_pop(&me, true), PopDisposition::Bubble);
        assert_eq!(route.will_pop(&me, false), PopDisposition::Pop);
    }

    #[test]
    fn test_lifecycle_legal_path() {
        let mut state = RouteLifecycle::Uninstalled;
        state.advance(RouteLifecycle::Installed);
        state.advance(RouteLifecycle::Active);
        state.advance(RouteLifecycle::PoppedPending);
        state.advance(RouteLifecycle::Disposed);
        assert!(state.is_disposed());

        let mut silent = RouteLifecycle::Active;
        silent.advance(RouteLifecycle::Disposed);
        assert!(silent.is_disposed());
    }

    #[test]
    #[should_panic(expected = "illegal route lifecycle transition")]
    fn test_lifecycle_double_dispose_panics() {
        let mut state = RouteLifecycle::Disposed;
        state.advance(RouteLifecycle::Disposed);
    }

    #[test]
    #[should_panic(expected = "illegal route lifecycle transition")]
    fn test_lifecycle_cannot_skip_install() {
        let mut state = RouteLifecycle::Uninstalled;
        state.advance(RouteLifecycle::Active);
    }

    #[test]
    fn test_pop_outcome_accessors() {
        assert!(PopOutcome::Popped(RouteId(2)).left_stack());
        assert!(!PopOutcome::HandledInternally(RouteId(2)).left_stack());
        assert_eq!(PopOutcome::HandledInternally(RouteId(2)).route(), RouteId(2));
    }
}
