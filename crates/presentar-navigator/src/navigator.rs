//! The route stack engine.
//!
//! A [`Navigator`] owns every route it was handed, the animations those
//! routes run, and the overlay entries they draw. Stack operations are
//! synchronous and leave every affected route, neighbour and observer
//! notified before they return. Time only moves through [`Navigator::tick`],
//! which advances animations, finishes train hops and disposes routes whose
//! exit has come to rest.

use crate::completion::{Completer, RouteCompletion};
use crate::config::NavigatorConfig;
use crate::error::NavigatorError;
use crate::factory::{initial_route_names, RouteFactory};
use crate::local_history::{HasLocalHistory, LocalHistory, LocalHistoryEntry, LocalHistoryHandle};
use crate::observer::{NavigatorObserver, SharedNavigatorObserver};
use crate::overlay::{EntryRole, Overlay, OverlayEntryId};
use crate::route::{Animated, PopDisposition, PopOutcome, Route, RouteId, RouteInfo, RouteLifecycle};
use crate::settings::RouteSettings;
use crate::transition::{Secondary, TransitionState};
use presentar_animation::{AnimationArena, AnimationError, AnimationId, Easing};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Frame length used by [`Navigator::settle`].
const SETTLE_FRAME: Duration = Duration::from_millis(16);

/// Why a route left the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Popped; disposed once its exit animation is at rest.
    Popped,
    /// Retired underneath `by`; disposed once `by` has finished entering.
    Replaced { by: RouteId },
}

/// A route placed by the navigator, with the future of its result.
#[derive(Debug)]
pub struct PushedRoute {
    pub id: RouteId,
    pub completion: RouteCompletion,
}

/// Presentation values for one visible overlay entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteFrame {
    pub route: RouteId,
    pub entry: OverlayEntryId,
    pub role: EntryRole,
    /// Raw progress of the route's own transition.
    pub primary: f64,
    /// Raw progress of the route above, as followed by this route.
    pub secondary: f64,
    pub curve: Easing,
}

impl RouteFrame {
    #[must_use]
    pub fn eased_primary(&self) -> f64 {
        self.curve.apply(self.primary)
    }

    #[must_use]
    pub fn eased_secondary(&self) -> f64 {
        self.curve.apply(self.secondary)
    }
}

struct RouteEntry {
    route: Box<dyn Route>,
    lifecycle: RouteLifecycle,
    transition: Option<TransitionState>,
    history: LocalHistory,
    completer: Option<Completer>,
    exit: Option<ExitReason>,
}

impl RouteEntry {
    fn info(&self, id: RouteId) -> RouteInfo {
        RouteInfo {
            id,
            settings: self.route.settings().clone(),
            kind: self.route.kind(),
            primary: self.primary_animation(),
            secondary: self.secondary_animation(),
        }
    }
}

impl HasLocalHistory for RouteEntry {
    fn local_history(&self) -> &LocalHistory {
        &self.history
    }
}

impl Animated for RouteEntry {
    fn primary_animation(&self) -> Option<AnimationId> {
        self.transition.as_ref().and_then(|transition| transition.primary_animation())
    }

    fn secondary_animation(&self) -> Option<AnimationId> {
        self.transition.as_ref().and_then(|transition| transition.secondary_animation())
    }
}

/// Stack of routes with animated transitions between them.
pub struct Navigator {
    config: NavigatorConfig,
    arena: AnimationArena,
    entries: BTreeMap<RouteId, RouteEntry>,
    /// Present routes, bottom to top.
    stack: Vec<RouteId>,
    /// Routes that left the stack and still render their exit.
    exiting: Vec<RouteId>,
    overlay: Overlay,
    observers: Vec<SharedNavigatorObserver>,
    route_factory: Option<RouteFactory>,
    unknown_route_factory: Option<RouteFactory>,
    next_route: u64,
    frame: u64,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavigatorConfig::default())
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("stack", &self.stack)
            .field("exiting", &self.exiting)
            .field("observers", &self.observers.len())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    #[must_use]
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            arena: AnimationArena::new(),
            entries: BTreeMap::new(),
            stack: Vec::new(),
            exiting: Vec::new(),
            overlay: Overlay::new(),
            observers: Vec::new(),
            route_factory: None,
            unknown_route_factory: None,
            next_route: 0,
            frame: 0,
        }
    }

    /// Factory consulted by the named operations.
    #[must_use]
    pub fn with_route_factory(
        mut self,
        factory: impl Fn(&RouteSettings) -> Option<Box<dyn Route>> + 'static,
    ) -> Self {
        self.route_factory = Some(Box::new(factory));
        self
    }

    /// Fallback for names the route factory does not know.
    #[must_use]
    pub fn with_unknown_route_factory(
        mut self,
        factory: impl Fn(&RouteSettings) -> Option<Box<dyn Route>> + 'static,
    ) -> Self {
        self.unknown_route_factory = Some(Box::new(factory));
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: SharedNavigatorObserver) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: SharedNavigatorObserver) {
        self.observers.push(observer);
    }

    // =========================================================================
    // Stack operations
    // =========================================================================

    /// Push `route` on top and start its entrance.
    pub fn push(&mut self, route: Box<dyn Route>) -> PushedRoute {
        let previous = self.top();
        let (id, completion) = self.install(route, None);
        self.stack.push(id);
        self.advance(id, RouteLifecycle::Active);
        self.drive(id, "forward", AnimationArena::forward);
        self.with_route(id, |route, info| route.did_push(info));
        self.change_next(id, None);
        self.change_previous(id, previous);
        if let Some(previous) = previous {
            self.change_next(previous, Some(id));
        }
        self.notify_push(id, previous);
        self.sync_overlay();
        tracing::debug!(route = %self.describe(id), depth = self.stack.len(), "route pushed");
        PushedRoute { id, completion }
    }

    /// Place `route` on top without an entrance animation.
    pub fn add(&mut self, route: Box<dyn Route>) -> PushedRoute {
        let previous = self.top();
        let (id, completion) = self.install(route, None);
        self.stack.push(id);
        self.advance(id, RouteLifecycle::Active);
        self.drive(id, "set_value", |arena, primary| arena.set_value(primary, 1.0));
        self.with_route(id, |route, info| route.did_add(info));
        self.change_next(id, None);
        self.change_previous(id, previous);
        if let Some(previous) = previous {
            self.change_next(previous, Some(id));
        }
        self.notify_push(id, previous);
        self.sync_overlay();
        tracing::debug!(route = %self.describe(id), depth = self.stack.len(), "route added");
        PushedRoute { id, completion }
    }

    /// Pop the current route with `result`.
    ///
    /// The route's local history is consulted first. A route whose
    /// [`did_pop`](crate::Poppable::did_pop) returns `false` stays on the
    /// stack; both cases report [`PopOutcome::HandledInternally`].
    pub fn pop(&mut self, result: Option<Value>) -> Result<PopOutcome, NavigatorError> {
        let top = self.top().ok_or(NavigatorError::EmptyStack)?;
        if self.entries.get(&top).is_some_and(|entry| entry.history.pop_last()) {
            tracing::debug!(route = %top, "pop handled by local history");
            return Ok(PopOutcome::HandledInternally(top));
        }
        if self.stack.len() == 1 {
            tracing::warn!(route = %top, "refusing to pop the last route");
            return Err(NavigatorError::CannotPopLastRoute);
        }

        let entry = self
            .entries
            .get_mut(&top)
            .ok_or(NavigatorError::RouteDisposed(top))?;
        let info = entry.info(top);
        if !entry.route.did_pop(&info, result.as_ref()) {
            tracing::debug!(route = %info, "route declined to pop");
            return Ok(PopOutcome::HandledInternally(top));
        }

        self.stack.pop();
        self.complete(top, result);
        self.retire(top, ExitReason::Popped);
        self.drive(top, "reverse", AnimationArena::reverse);

        let new_top = self.top();
        if let Some(new_top) = new_top {
            self.pop_next(new_top, &info);
        }
        let previous = new_top.and_then(|id| self.info(id));
        self.notify(|observer| observer.did_pop(&info, previous.as_ref()));
        self.sync_overlay();
        tracing::debug!(route = %info, depth = self.stack.len(), "route popped");
        Ok(PopOutcome::Popped(top))
    }

    /// Put `route` in the place of `old`, which is disposed right away.
    ///
    /// The new route continues the old route's primary animation.
    pub fn replace(&mut self, old: RouteId, route: Box<dyn Route>) -> Result<PushedRoute, NavigatorError> {
        let index = self.index_of(old)?;
        let old_info = self.info(old).ok_or(NavigatorError::RouteDisposed(old))?;

        let (id, completion) = self.install(route, Some(old));
        self.stack[index] = id;
        self.advance(id, RouteLifecycle::Active);
        match old_info.primary {
            Some(from) => self.drive(id, "adopt", |arena, primary| arena.adopt(primary, from)),
            None => self.drive(id, "set_value", |arena, primary| arena.set_value(primary, 1.0)),
        }
        self.with_route(id, |route, info| route.did_replace(info, Some(&old_info)));

        let previous = self.below(index);
        let next = self.stack.get(index + 1).copied();
        self.change_next(id, next);
        self.change_previous(id, previous);
        if let Some(previous) = previous {
            self.change_next(previous, Some(id));
        }
        if let Some(next) = next {
            self.change_previous(next, Some(id));
        }

        let new_info = self.info(id);
        self.notify(|observer| observer.did_replace(new_info.as_ref(), Some(&old_info)));
        self.dispose_route(old);
        self.sync_overlay();
        tracing::debug!(route = %self.describe(id), replaced = %old_info, "route replaced");
        Ok(PushedRoute { id, completion })
    }

    /// [`replace`](Self::replace) the route directly below `anchor`.
    pub fn replace_route_below(
        &mut self,
        anchor: RouteId,
        route: Box<dyn Route>,
    ) -> Result<PushedRoute, NavigatorError> {
        let index = self.index_of(anchor)?;
        let old = self.below(index).ok_or(NavigatorError::NoRouteBelow(anchor))?;
        self.replace(old, route)
    }

    /// [`remove_route`](Self::remove_route) the route directly below `anchor`.
    pub fn remove_route_below(&mut self, anchor: RouteId) -> Result<(), NavigatorError> {
        let index = self.index_of(anchor)?;
        let old = self.below(index).ok_or(NavigatorError::NoRouteBelow(anchor))?;
        self.remove_route(old)
    }

    /// Remove a present route without animation and dispose it.
    pub fn remove_route(&mut self, id: RouteId) -> Result<(), NavigatorError> {
        let index = self.index_of(id)?;
        if self.stack.len() == 1 {
            return Err(NavigatorError::CannotRemoveLastRoute);
        }
        let info = self.info(id).ok_or(NavigatorError::RouteDisposed(id))?;

        self.stack.remove(index);
        let previous = self.below(index);
        let next = self.stack.get(index).copied();
        if let Some(previous) = previous {
            self.change_next(previous, next);
        }
        if let Some(next) = next {
            self.change_previous(next, previous);
        }

        let previous_info = previous.and_then(|id| self.info(id));
        self.notify(|observer| observer.did_remove(&info, previous_info.as_ref()));
        self.dispose_route(id);
        self.sync_overlay();
        tracing::debug!(route = %info, depth = self.stack.len(), "route removed");
        Ok(())
    }

    /// Pop until `predicate` accepts the current route.
    ///
    /// Stops early when the next pop would remove the last route or when the
    /// current route declines to pop. Returns how many pops ran, including
    /// those absorbed by local history.
    pub fn pop_until(&mut self, mut predicate: impl FnMut(&RouteInfo) -> bool) -> Result<usize, NavigatorError> {
        let mut pops = 0;
        loop {
            let top = self.top().ok_or(NavigatorError::EmptyStack)?;
            let info = self.info(top).ok_or(NavigatorError::RouteDisposed(top))?;
            if predicate(&info) {
                break;
            }
            let history = self.local_history_len(top);
            if self.stack.len() == 1 && history == 0 {
                break;
            }
            let outcome = self.pop(None)?;
            pops += 1;
            if !outcome.left_stack() && history == 0 {
                tracing::debug!(route = %info, "pop_until stopped by a route that declined to pop");
                break;
            }
        }
        Ok(pops)
    }

    /// Push `route` and retire the current route, which completes with
    /// `result` and keeps rendering until `route` has entered.
    pub fn push_replacement(
        &mut self,
        route: Box<dyn Route>,
        result: Option<Value>,
    ) -> Result<PushedRoute, NavigatorError> {
        let old = self.top().ok_or(NavigatorError::EmptyStack)?;
        let old_info = self.info(old).ok_or(NavigatorError::RouteDisposed(old))?;
        let index = self.stack.len() - 1;

        let (id, completion) = self.install(route, None);
        self.stack[index] = id;
        self.advance(id, RouteLifecycle::Active);
        self.drive(id, "forward", AnimationArena::forward);
        self.with_route(id, |route, info| route.did_push(info));
        self.change_next(id, None);
        let previous = self.below(index);
        self.change_previous(id, previous);
        if let Some(previous) = previous {
            self.change_next(previous, Some(id));
        }

        self.complete(old, result);
        self.retire(old, ExitReason::Replaced { by: id });
        let new_info = self.info(id);
        self.notify(|observer| observer.did_replace(new_info.as_ref(), Some(&old_info)));
        self.sync_overlay();
        tracing::debug!(route = %self.describe(id), replaced = %old_info, "route pushed as replacement");
        Ok(PushedRoute { id, completion })
    }

    /// Push `route`, then retire the routes below it until `predicate`
    /// accepts one. Retired routes keep rendering until `route` has entered.
    pub fn push_and_remove_until(
        &mut self,
        route: Box<dyn Route>,
        mut predicate: impl FnMut(&RouteInfo) -> bool,
    ) -> PushedRoute {
        let (id, completion) = self.install(route, None);
        self.stack.push(id);
        self.advance(id, RouteLifecycle::Active);
        self.drive(id, "forward", AnimationArena::forward);
        self.with_route(id, |route, info| route.did_push(info));
        self.change_next(id, None);

        let mut removed = Vec::new();
        while self.stack.len() > 1 {
            let index = self.stack.len() - 2;
            let candidate = self.stack[index];
            let Some(info) = self.info(candidate) else {
                break;
            };
            if predicate(&info) {
                break;
            }
            self.stack.remove(index);
            self.retire(candidate, ExitReason::Replaced { by: id });
            removed.push(info);
        }

        let previous = self.stack.len().checked_sub(2).map(|index| self.stack[index]);
        self.change_previous(id, previous);
        if let Some(previous) = previous {
            self.change_next(previous, Some(id));
        }
        self.notify_push(id, previous);
        let previous_info = previous.and_then(|id| self.info(id));
        for info in &removed {
            self.notify(|observer| observer.did_remove(info, previous_info.as_ref()));
        }
        self.sync_overlay();
        tracing::debug!(route = %self.describe(id), removed = removed.len(), "route pushed and stack trimmed");
        PushedRoute { id, completion }
    }

    /// Ask the current route whether a back request should pop it.
    ///
    /// Returns `false` when the request should bubble to whoever hosts the
    /// navigator.
    pub fn maybe_pop(&mut self, result: Option<Value>) -> Result<bool, NavigatorError> {
        let top = self.top().ok_or(NavigatorError::EmptyStack)?;
        let entry = self.entries.get(&top).ok_or(NavigatorError::RouteDisposed(top))?;
        let disposition = if entry.will_handle_pop_internally() {
            PopDisposition::Pop
        } else {
            entry.route.will_pop(&entry.info(top), self.stack.len() == 1)
        };
        match disposition {
            PopDisposition::Bubble => Ok(false),
            PopDisposition::DoNotPop => {
                tracing::debug!(route = %top, "route vetoed back request");
                Ok(true)
            }
            PopDisposition::Pop => {
                self.pop(result)?;
                Ok(true)
            }
        }
    }

    /// Whether a pop would do anything.
    #[must_use]
    pub fn can_pop(&self) -> bool {
        self.stack.len() > 1
            || self
                .top()
                .and_then(|top| self.entries.get(&top))
                .is_some_and(|entry| entry.will_handle_pop_internally())
    }

    /// Pop `route` if it is the current route and its barrier dismisses it.
    /// Returns whether a pop ran.
    pub fn handle_barrier_tap(&mut self, route: RouteId) -> Result<bool, NavigatorError> {
        self.index_of(route)?;
        let dismissible = self.top() == Some(route)
            && self
                .entries
                .get(&route)
                .is_some_and(|entry| entry.route.kind().barrier_dismissible());
        if !dismissible {
            return Ok(false);
        }
        self.pop(None)?;
        Ok(true)
    }

    // =========================================================================
    // Named routes
    // =========================================================================

    /// Build `name` through the route factory and push it.
    pub fn push_named(&mut self, name: &str, arguments: Option<Value>) -> Result<PushedRoute, NavigatorError> {
        let route = self.build(&RouteSettings::named(name).with_arguments(arguments))?;
        Ok(self.push(route))
    }

    /// Build `name` and [`push_replacement`](Self::push_replacement) it.
    pub fn push_replacement_named(
        &mut self,
        name: &str,
        arguments: Option<Value>,
        result: Option<Value>,
    ) -> Result<PushedRoute, NavigatorError> {
        let route = self.build(&RouteSettings::named(name).with_arguments(arguments))?;
        self.push_replacement(route, result)
    }

    /// Pop the current route with `result`, then push `name`.
    pub fn pop_and_push_named(
        &mut self,
        name: &str,
        arguments: Option<Value>,
        result: Option<Value>,
    ) -> Result<PushedRoute, NavigatorError> {
        let route = self.build(&RouteSettings::named(name).with_arguments(arguments))?;
        self.pop(result)?;
        Ok(self.push(route))
    }

    /// Build the initial stack from the configured initial route.
    ///
    /// Every prefix of a deep link that the route factory knows is added
    /// without animation. When the link's target is unknown, or nothing was
    /// built, the stack starts from `/` alone.
    pub fn generate_initial_routes(&mut self) -> Result<Vec<RouteId>, NavigatorError> {
        let initial_route = self.config.initial_route.clone();
        let mut candidates: Vec<Option<Box<dyn Route>>> = initial_route_names(&initial_route)
            .iter()
            .map(|name| {
                self.route_factory
                    .as_ref()
                    .and_then(|factory| factory(&RouteSettings::named(name.as_str())))
            })
            .collect();
        if candidates.last().is_some_and(|route| route.is_none()) {
            tracing::warn!(initial_route = %initial_route, "initial route is unknown; starting from /");
            candidates.clear();
        }
        let mut routes: Vec<Box<dyn Route>> = candidates.into_iter().flatten().collect();
        if routes.is_empty() {
            routes.push(self.build(&RouteSettings::named("/"))?);
        }
        let ids: Vec<RouteId> = routes.into_iter().map(|route| self.add(route).id).collect();
        tracing::debug!(initial_route = %initial_route, depth = self.stack.len(), "initial routes generated");
        Ok(ids)
    }

    fn build(&self, settings: &RouteSettings) -> Result<Box<dyn Route>, NavigatorError> {
        if self.route_factory.is_none() && self.unknown_route_factory.is_none() {
            return Err(NavigatorError::NoRouteFactory);
        }
        if let Some(route) = self.route_factory.as_ref().and_then(|factory| factory(settings)) {
            return Ok(route);
        }
        if let Some(route) = self
            .unknown_route_factory
            .as_ref()
            .and_then(|factory| factory(settings))
        {
            tracing::warn!(name = ?settings.name(), "unknown route name; using fallback route");
            return Ok(route);
        }
        tracing::warn!(name = ?settings.name(), "no route for name");
        Err(NavigatorError::UnknownRoute(settings.name().unwrap_or_default().to_string()))
    }

    // =========================================================================
    // Local history
    // =========================================================================

    /// Register a local history entry on a present route.
    pub fn add_local_history_entry(
        &mut self,
        route: RouteId,
        entry: LocalHistoryEntry,
    ) -> Result<LocalHistoryHandle, NavigatorError> {
        self.index_of(route)?;
        let owner = self.entries.get(&route).ok_or(NavigatorError::RouteDisposed(route))?;
        Ok(owner.add_local_history_entry(entry))
    }

    #[must_use]
    pub fn local_history_len(&self, route: RouteId) -> usize {
        self.entries.get(&route).map_or(0, |entry| entry.history.len())
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Advance time by `dt`, clamped to the configured maximum.
    ///
    /// Animations tick first, then finished train hops settle, overlay
    /// opacity follows the new values, and routes whose exit is at rest are
    /// disposed. Returns whether another frame is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let dt = dt.min(self.config.max_frame_delta());
        self.frame += 1;
        self.arena.tick(dt);
        self.settle_hops();
        self.sync_overlay();
        self.finalize_exiting();
        let needs_frame = self.needs_frame();
        tracing::trace!(frame = self.frame, needs_frame, "navigator tick");
        needs_frame
    }

    /// Whether animations are running or routes are waiting to be disposed.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.arena.is_ticking()
            || !self.exiting.is_empty()
            || self
                .entries
                .values()
                .any(|entry| entry.transition.as_ref().is_some_and(|t| t.state().is_hopping()))
    }

    /// Tick with `frame` until nothing needs a frame. Returns the number of
    /// ticks run.
    pub fn run_until_settled(&mut self, frame: Duration, max_frames: u32) -> Result<u32, NavigatorError> {
        for ticks in 0..max_frames {
            if !self.needs_frame() {
                return Ok(ticks);
            }
            self.tick(frame);
        }
        if self.needs_frame() {
            tracing::warn!(max_frames, "navigator did not settle");
            return Err(NavigatorError::DidNotSettle(max_frames));
        }
        Ok(max_frames)
    }

    /// [`run_until_settled`](Self::run_until_settled) with 16ms frames and
    /// the configured frame limit.
    pub fn settle(&mut self) -> Result<u32, NavigatorError> {
        self.run_until_settled(SETTLE_FRAME, self.config.settle_frame_limit)
    }

    /// Presentation values of every visible overlay entry, bottom to top.
    #[must_use]
    pub fn frames(&self) -> Vec<RouteFrame> {
        self.overlay
            .visible()
            .into_iter()
            .filter_map(|entry| {
                let owner = self.entries.get(&entry.route)?;
                let (primary, secondary, curve) = match &owner.transition {
                    Some(transition) => (
                        self.arena.value(transition.primary()),
                        self.arena.value(transition.secondary()),
                        transition.spec().curve,
                    ),
                    None => (1.0, 0.0, Easing::Linear),
                };
                Some(RouteFrame {
                    route: entry.route,
                    entry: entry.id,
                    role: entry.role,
                    primary,
                    secondary,
                    curve,
                })
            })
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of present routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The current route.
    #[must_use]
    pub fn top(&self) -> Option<RouteId> {
        self.stack.last().copied()
    }

    /// Present routes, bottom to top.
    #[must_use]
    pub fn route_ids(&self) -> &[RouteId] {
        &self.stack
    }

    /// Routes still rendering their exit.
    #[must_use]
    pub fn exiting(&self) -> &[RouteId] {
        &self.exiting
    }

    /// Snapshot of a route that has not been disposed.
    #[must_use]
    pub fn info(&self, id: RouteId) -> Option<RouteInfo> {
        self.entries.get(&id).map(|entry| entry.info(id))
    }

    /// Lifecycle of any route this navigator created.
    #[must_use]
    pub fn lifecycle(&self, id: RouteId) -> Option<RouteLifecycle> {
        match self.entries.get(&id) {
            Some(entry) => Some(entry.lifecycle),
            None if id.0 < self.next_route => Some(RouteLifecycle::Disposed),
            None => None,
        }
    }

    #[must_use]
    pub fn exit_reason(&self, id: RouteId) -> Option<ExitReason> {
        self.entries.get(&id).and_then(|entry| entry.exit)
    }

    #[must_use]
    pub fn is_current(&self, id: RouteId) -> bool {
        self.top() == Some(id)
    }

    #[must_use]
    pub fn is_first(&self, id: RouteId) -> bool {
        self.stack.first() == Some(&id)
    }

    /// Whether the route is on the stack.
    #[must_use]
    pub fn is_active(&self, id: RouteId) -> bool {
        self.stack.contains(&id)
    }

    #[must_use]
    pub fn secondary_state(&self, id: RouteId) -> Option<Secondary> {
        self.entries
            .get(&id)?
            .transition
            .as_ref()
            .map(TransitionState::state)
    }

    #[must_use]
    pub const fn animations(&self) -> &AnimationArena {
        &self.arena
    }

    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn install(&mut self, route: Box<dyn Route>, above: Option<RouteId>) -> (RouteId, RouteCompletion) {
        let id = RouteId(self.next_route);
        self.next_route += 1;
        let kind = route.kind();
        let transition = if kind.has_transition() {
            let spec = route.transition().unwrap_or_else(|| self.config.transition_for(kind));
            Some(TransitionState::new(&mut self.arena, id, spec))
        } else {
            None
        };
        self.overlay.insert(id, kind, above);
        let (completer, completion) = RouteCompletion::channel();
        self.entries.insert(
            id,
            RouteEntry {
                route,
                lifecycle: RouteLifecycle::Uninstalled,
                transition,
                history: LocalHistory::new(id),
                completer: Some(completer),
                exit: None,
            },
        );
        self.with_route(id, |route, info| route.install(info));
        self.advance(id, RouteLifecycle::Installed);
        (id, completion)
    }

    fn index_of(&self, id: RouteId) -> Result<usize, NavigatorError> {
        if let Some(index) = self.stack.iter().position(|present| *present == id) {
            return Ok(index);
        }
        if self.lifecycle(id) == Some(RouteLifecycle::Disposed) {
            Err(NavigatorError::RouteDisposed(id))
        } else {
            Err(NavigatorError::RouteNotInStack(id))
        }
    }

    fn below(&self, index: usize) -> Option<RouteId> {
        index.checked_sub(1).and_then(|below| self.stack.get(below).copied())
    }

    fn describe(&self, id: RouteId) -> String {
        self.info(id).map_or_else(|| id.to_string(), |info| info.to_string())
    }

    fn advance(&mut self, id: RouteId, next: RouteLifecycle) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.lifecycle.advance(next);
        }
    }

    fn with_route(&mut self, id: RouteId, hook: impl FnOnce(&mut dyn Route, &RouteInfo)) {
        if let Some(entry) = self.entries.get_mut(&id) {
            let info = entry.info(id);
            hook(entry.route.as_mut(), &info);
        }
    }

    /// Run an animation command against the primary of `id`, if it has one.
    fn drive(
        &mut self,
        id: RouteId,
        action: &'static str,
        command: impl FnOnce(&mut AnimationArena, AnimationId) -> Result<(), AnimationError>,
    ) {
        let Some(primary) = self.entries.get(&id).and_then(|entry| entry.primary_animation()) else {
            return;
        };
        if let Err(err) = command(&mut self.arena, primary) {
            tracing::warn!(route = %id, action, error = %err, "primary animation command failed");
        }
    }

    fn change_next(&mut self, id: RouteId, next: Option<RouteId>) {
        let next = next.and_then(|next| self.info(next));
        self.update_secondary(id, next.as_ref());
        self.with_route(id, |route, info| route.did_change_next(info, next.as_ref()));
    }

    fn change_previous(&mut self, id: RouteId, previous: Option<RouteId>) {
        let previous = previous.and_then(|previous| self.info(previous));
        self.with_route(id, |route, info| route.did_change_previous(info, previous.as_ref()));
    }

    fn pop_next(&mut self, id: RouteId, popped: &RouteInfo) {
        self.update_secondary(id, Some(popped));
        self.with_route(id, |route, info| route.did_pop_next(info, popped));
    }

    /// Bind the secondary animation of `id` to `next`, when both routes agree
    /// to transition into each other.
    fn update_secondary(&mut self, id: RouteId, next: Option<&RouteInfo>) {
        let target = next.and_then(|next| {
            let primary = next.primary?;
            let this = self.entries.get(&id)?;
            let other = self.entries.get(&next.id)?;
            let allowed = this.route.can_transition_to(next) && other.route.can_transition_from(&this.info(id));
            allowed.then_some((next.id, primary))
        });
        let Some(transition) = self.entries.get_mut(&id).and_then(|entry| entry.transition.as_mut()) else {
            return;
        };
        if let Err(err) = transition.update_secondary(&mut self.arena, target) {
            tracing::warn!(route = %id, error = %err, "secondary animation update failed");
        }
        if transition.state().is_hopping() {
            tracing::trace!(route = %id, "secondary animation hopping trains");
        }
    }

    fn complete(&mut self, id: RouteId, result: Option<Value>) {
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        let info = entry.info(id);
        entry.route.did_complete(&info, result.as_ref());
        if let Some(completer) = entry.completer.take() {
            // The caller may have dropped the completion.
            let _ = completer.send(result);
        }
    }

    fn retire(&mut self, id: RouteId, reason: ExitReason) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.lifecycle.advance(RouteLifecycle::PoppedPending);
            entry.exit = Some(reason);
        }
        self.exiting.push(id);
    }

    fn notify(&self, event: impl Fn(&mut dyn NavigatorObserver)) {
        for observer in &self.observers {
            match observer.try_borrow_mut() {
                Ok(mut observer) => event(&mut *observer),
                Err(_) => tracing::warn!("navigator observer is busy; notification dropped"),
            }
        }
    }

    fn notify_push(&self, id: RouteId, previous: Option<RouteId>) {
        let Some(info) = self.info(id) else {
            return;
        };
        let previous = previous.and_then(|previous| self.info(previous));
        self.notify(|observer| observer.did_push(&info, previous.as_ref()));
    }

    fn settle_hops(&mut self) {
        for (id, entry) in &mut self.entries {
            let Some(transition) = entry.transition.as_mut() else {
                continue;
            };
            match transition.settle(&mut self.arena) {
                Ok(true) => tracing::trace!(route = %id, "train hop settled"),
                Ok(false) => {}
                Err(err) => tracing::warn!(route = %id, error = %err, "train hop settle failed"),
            }
        }
    }

    /// Pages hide what is below them once fully entered.
    fn sync_overlay(&mut self) {
        let entries = &self.entries;
        let arena = &self.arena;
        self.overlay.sync_opacity(|id| {
            let entry = entries.get(&id).filter(|entry| entry.route.kind().is_page())?;
            Some(
                entry
                    .primary_animation()
                    .is_some_and(|primary| arena.status(primary).is_completed()),
            )
        });
    }

    fn exit_finished(&self, id: RouteId) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            return true;
        };
        let at_rest = |owner: Option<&RouteEntry>| {
            owner
                .and_then(|owner| owner.primary_animation())
                .map_or(true, |primary| !self.arena.is_animating(primary))
        };
        match entry.exit {
            Some(ExitReason::Replaced { by }) => at_rest(self.entries.get(&by)),
            Some(ExitReason::Popped) | None => at_rest(Some(entry)),
        }
    }

    fn finalize_exiting(&mut self) {
        let finished: Vec<RouteId> = self
            .exiting
            .iter()
            .copied()
            .filter(|id| self.exit_finished(*id))
            .collect();
        for id in finished {
            self.dispose_route(id);
        }
    }

    fn dispose_route(&mut self, id: RouteId) {
        let Some(mut entry) = self.entries.remove(&id) else {
            return;
        };
        let info = entry.info(id);
        entry.lifecycle.advance(RouteLifecycle::Disposed);

        for (other, neighbour) in &mut self.entries {
            let Some(transition) = neighbour.transition.as_mut() else {
                continue;
            };
            match transition.release_source(&mut self.arena, id) {
                Ok(true) => tracing::trace!(route = %other, released = %id, "secondary animation released"),
                Ok(false) => {}
                Err(err) => tracing::warn!(route = %other, error = %err, "secondary animation release failed"),
            }
        }

        entry.route.dispose(&info);
        entry.history.dispose();
        if let Some(transition) = entry.transition.as_mut() {
            transition.dispose(&mut self.arena);
        }
        self.overlay.remove_route(id);
        if let Some(completer) = entry.completer.take() {
            let _ = completer.send(None);
        }
        self.exiting.retain(|exiting| *exiting != id);
        tracing::debug!(route = %info, "route disposed");
    }
}
