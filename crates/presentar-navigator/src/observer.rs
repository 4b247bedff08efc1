//! Navigator observers and per-route subscriptions.
//!
//! A [`NavigatorObserver`] hears about every stack change. A [`RouteObserver`]
//! is one such observer that forwards push and pop events to [`RouteAware`]
//! listeners subscribed to a particular route. Listeners are held weakly, so
//! a dropped listener never keeps a route entry alive.

use crate::route::{RouteId, RouteInfo};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Receives every change a navigator makes to its stack.
pub trait NavigatorObserver {
    /// `route` was pushed or added on top of `previous`.
    fn did_push(&mut self, _route: &RouteInfo, _previous: Option<&RouteInfo>) {}

    /// `route` was popped, uncovering `previous`.
    fn did_pop(&mut self, _route: &RouteInfo, _previous: Option<&RouteInfo>) {}

    /// `route`, which sat above `previous`, was removed without animation.
    fn did_remove(&mut self, _route: &RouteInfo, _previous: Option<&RouteInfo>) {}

    /// `new` took the place of `old`.
    fn did_replace(&mut self, _new: Option<&RouteInfo>, _old: Option<&RouteInfo>) {}
}

/// Shared handle to a [`NavigatorObserver`].
pub type SharedNavigatorObserver = Rc<RefCell<dyn NavigatorObserver>>;

/// Listener interested in one route's visibility.
pub trait RouteAware {
    /// The route was pushed, or the listener subscribed to it.
    fn did_push(&mut self) {}

    /// The route was popped.
    fn did_pop(&mut self) {}

    /// A route was pushed on top of the route.
    fn did_push_next(&mut self) {}

    /// The route on top of the route was popped; it is current again.
    fn did_pop_next(&mut self) {}
}

/// Shared handle to a [`RouteAware`] listener.
pub type SharedRouteAware = Rc<RefCell<dyn RouteAware>>;

/// Which routes a [`RouteObserver`] reports on.
#[derive(Clone, Copy, Default)]
pub enum RouteFilter {
    /// Page routes only.
    #[default]
    Pages,
    /// Popup routes only.
    Popups,
    /// Every route.
    Any,
    Custom(fn(&RouteInfo) -> bool),
}

impl std::fmt::Debug for RouteFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pages => f.write_str("Pages"),
            Self::Popups => f.write_str("Popups"),
            Self::Any => f.write_str("Any"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl RouteFilter {
    #[must_use]
    pub fn matches(&self, route: &RouteInfo) -> bool {
        match self {
            Self::Pages => route.kind.is_page(),
            Self::Popups => route.kind.is_popup(),
            Self::Any => true,
            Self::Custom(predicate) => predicate(route),
        }
    }
}

/// Forwards push and pop events to listeners subscribed per route.
#[derive(Default)]
pub struct RouteObserver {
    filter: RouteFilter,
    listeners: BTreeMap<RouteId, Vec<Weak<RefCell<dyn RouteAware>>>>,
}

impl RouteObserver {
    /// Observer for page routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: RouteFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn filter(&self) -> RouteFilter {
        self.filter
    }

    /// Subscribe `listener` to `route`.
    ///
    /// The listener immediately receives `did_push`, so a late subscriber
    /// still learns that its route is showing. Subscribing the same listener
    /// to the same route again does nothing and returns `false`.
    pub fn subscribe(&mut self, listener: &SharedRouteAware, route: RouteId) -> bool {
        let weak = Rc::downgrade(listener);
        let subscribers = self.listeners.entry(route).or_default();
        if subscribers.iter().any(|existing| Weak::ptr_eq(existing, &weak)) {
            return false;
        }
        subscribers.push(weak);
        tracing::trace!(route = %route, "route listener subscribed");
        listener.borrow_mut().did_push();
        true
    }

    /// Remove `listener` from every route. Routes left without listeners are
    /// dropped. Returns how many routes the listener left.
    pub fn unsubscribe(&mut self, listener: &SharedRouteAware) -> usize {
        let weak = Rc::downgrade(listener);
        let mut left = 0;
        for subscribers in self.listeners.values_mut() {
            let before = subscribers.len();
            subscribers.retain(|existing| !Weak::ptr_eq(existing, &weak));
            left += before - subscribers.len();
        }
        self.listeners.retain(|_, subscribers| !subscribers.is_empty());
        left
    }

    /// Whether any live listener is subscribed to `route`.
    #[must_use]
    pub fn is_observing(&self, route: RouteId) -> bool {
        self.subscriber_count(route) > 0
    }

    /// Live listeners of `route`; dropped listeners are not counted.
    #[must_use]
    pub fn subscriber_count(&self, route: RouteId) -> usize {
        self.listeners
            .get(&route)
            .map_or(0, |subscribers| subscribers.iter().filter(|weak| weak.strong_count() > 0).count())
    }

    /// Routes with at least one live listener.
    #[must_use]
    pub fn observed_routes(&self) -> Vec<RouteId> {
        self.listeners
            .iter()
            .filter(|(_, subscribers)| subscribers.iter().any(|weak| weak.strong_count() > 0))
            .map(|(route, _)| *route)
            .collect()
    }

    /// Drop dead listeners everywhere, and the routes they leave empty.
    fn prune(&mut self) {
        for subscribers in self.listeners.values_mut() {
            subscribers.retain(|weak| weak.strong_count() > 0);
        }
        self.listeners.retain(|_, subscribers| !subscribers.is_empty());
    }

    /// Forget a route that left the navigator.
    fn forget(&mut self, route: RouteId) {
        if self.listeners.remove(&route).is_some() {
            tracing::trace!(route = %route, "route listeners released");
        }
    }

    fn live(&self, route: RouteId) -> Vec<SharedRouteAware> {
        self.listeners
            .get(&route)
            .map(|subscribers| subscribers.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for RouteObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteObserver")
            .field("filter", &self.filter)
            .field("observed_routes", &self.observed_routes())
            .finish()
    }
}

impl NavigatorObserver for RouteObserver {
    fn did_push(&mut self, route: &RouteInfo, previous: Option<&RouteInfo>) {
        self.prune();
        let Some(previous) = previous else {
            return;
        };
        if !(self.filter.matches(route) && self.filter.matches(previous)) {
            return;
        }
        for listener in self.live(previous.id) {
            listener.borrow_mut().did_push_next();
        }
    }

    fn did_pop(&mut self, route: &RouteInfo, previous: Option<&RouteInfo>) {
        self.prune();
        let Some(previous) = previous else {
            return;
        };
        if !(self.filter.matches(route) && self.filter.matches(previous)) {
            return;
        }
        for listener in self.live(previous.id) {
            listener.borrow_mut().did_pop_next();
        }
        for listener in self.live(route.id) {
            listener.borrow_mut().did_pop();
        }
    }

    fn did_remove(&mut self, route: &RouteInfo, _previous: Option<&RouteInfo>) {
        self.prune();
        self.forget(route.id);
    }

    fn did_replace(&mut self, _new: Option<&RouteInfo>, old: Option<&RouteInfo>) {
        self.prune();
        if let Some(old) = old {
            self.forget(old.id);
        }
    }
}
