//! Arena owning every animation node.
//!
//! Nodes are addressed by [`AnimationId`]. Controllers are the only nodes
//! the clock moves; constants, proxies and train-hopping composites derive
//! their value from other nodes. Each node remembers which nodes derive from
//! it so that a change can be pushed to every listener downstream.
//!
//! # Example
//!
//! ```
//! use presentar_animation::{AnimationArena, AnimationStatus};
//! use std::time::Duration;
//!
//! let mut arena = AnimationArena::new();
//! let primary = arena.controller(Duration::from_millis(100), None);
//! let secondary = arena.proxy(Some(primary)).unwrap();
//!
//! arena.forward(primary).unwrap();
//! arena.tick(Duration::from_millis(50));
//! assert!((arena.value(secondary) - 0.5).abs() < 1e-9);
//! assert_eq!(arena.status(secondary), AnimationStatus::Forward);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::controller::{AnimationStatus, Controller};
use crate::error::AnimationError;
use crate::train_hopping::TrainHopping;

/// Handle to a node in an [`AnimationArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub(crate) u64);

impl AnimationId {
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

/// Handle to a registered value or status listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked with the new value.
pub type ValueListener = Box<dyn FnMut(f64)>;

/// Callback invoked with the new status.
pub type StatusListener = Box<dyn FnMut(AnimationStatus)>;

/// What a node is, without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Controller,
    Constant,
    Proxy,
    TrainHopping,
    /// Disposed, but still read by a dependent.
    Frozen,
}

#[derive(Debug)]
enum Source {
    Controller(Controller),
    Constant {
        value: f64,
        status: AnimationStatus,
    },
    /// `value`/`status` hold the last reading when the proxy has no parent.
    Proxy {
        parent: Option<AnimationId>,
        value: f64,
        status: AnimationStatus,
    },
    TrainHopping(TrainHopping),
    Frozen {
        value: f64,
        status: AnimationStatus,
    },
}

impl Source {
    const fn kind(&self) -> AnimationKind {
        match self {
            Self::Controller(_) => AnimationKind::Controller,
            Self::Constant { .. } => AnimationKind::Constant,
            Self::Proxy { .. } => AnimationKind::Proxy,
            Self::TrainHopping(_) => AnimationKind::TrainHopping,
            Self::Frozen { .. } => AnimationKind::Frozen,
        }
    }

    /// Nodes this one reads from.
    fn observed(&self) -> Vec<AnimationId> {
        match self {
            Self::Proxy {
                parent: Some(parent),
                ..
            } => vec![*parent],
            Self::TrainHopping(hop) => std::iter::once(hop.current).chain(hop.next).collect(),
            _ => Vec::new(),
        }
    }
}

struct Node {
    source: Source,
    label: Option<String>,
    dependents: Vec<AnimationId>,
    value_listeners: Vec<(ListenerId, ValueListener)>,
    status_listeners: Vec<(ListenerId, StatusListener)>,
    last_value: f64,
    last_status: AnimationStatus,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("source", &self.source)
            .field("label", &self.label)
            .field("dependents", &self.dependents)
            .field("value_listeners", &self.value_listeners.len())
            .field("status_listeners", &self.status_listeners.len())
            .finish_non_exhaustive()
    }
}

/// Owner of all animation nodes, driven by [`tick`](Self::tick).
#[derive(Debug)]
pub struct AnimationArena {
    nodes: BTreeMap<AnimationId, Node>,
    next_id: u64,
    next_listener: u64,
    dismissed: AnimationId,
    completed: AnimationId,
}

impl Default for AnimationArena {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationArena {
    /// Create an arena holding only the two shared sentinels.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            next_listener: 0,
            dismissed: AnimationId(0),
            completed: AnimationId(0),
        };
        arena.dismissed = arena.insert(
            Source::Constant {
                value: 0.0,
                status: AnimationStatus::Dismissed,
            },
            Some("always-dismissed"),
        );
        arena.completed = arena.insert(
            Source::Constant {
                value: 1.0,
                status: AnimationStatus::Completed,
            },
            Some("always-complete"),
        );
        arena
    }

    /// Shared constant at 0.0, dismissed. Never disposed.
    #[must_use]
    pub const fn always_dismissed(&self) -> AnimationId {
        self.dismissed
    }

    /// Shared constant at 1.0, completed. Never disposed.
    #[must_use]
    pub const fn always_complete(&self) -> AnimationId {
        self.completed
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a dismissed controller.
    pub fn controller(&mut self, duration: Duration, reverse_duration: Option<Duration>) -> AnimationId {
        let mut controller = Controller::new(duration);
        if let Some(reverse) = reverse_duration {
            controller = controller.with_reverse_duration(reverse);
        }
        self.add_controller(controller)
    }

    /// Add an existing controller, keeping its position.
    pub fn add_controller(&mut self, controller: Controller) -> AnimationId {
        self.insert(Source::Controller(controller), None)
    }

    /// Add a constant node.
    pub fn constant(&mut self, value: f64, status: AnimationStatus) -> AnimationId {
        self.insert(
            Source::Constant {
                value: value.clamp(0.0, 1.0),
                status,
            },
            None,
        )
    }

    /// Add a proxy reading through `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::UnknownAnimation`] if `parent` does not exist.
    pub fn proxy(&mut self, parent: Option<AnimationId>) -> Result<AnimationId, AnimationError> {
        if let Some(parent) = parent {
            self.ensure(parent)?;
        }
        let (value, status) = parent.map_or((0.0, AnimationStatus::Dismissed), |p| self.resolve(p));
        let id = self.insert(Source::Proxy { parent, value, status }, None);
        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        Ok(id)
    }

    /// Add a proxy reading through the always-dismissed sentinel.
    pub fn dismissed_proxy(&mut self) -> AnimationId {
        let dismissed = self.dismissed;
        let id = self.insert(
            Source::Proxy {
                parent: Some(dismissed),
                value: 0.0,
                status: AnimationStatus::Dismissed,
            },
            None,
        );
        self.attach(id, dismissed);
        id
    }

    /// Add a composite that follows `current` until `next` catches up.
    ///
    /// When both trains already agree the composite starts out on `next`.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::UnknownAnimation`] if either train is missing.
    pub fn train_hopping(&mut self, current: AnimationId, next: AnimationId) -> Result<AnimationId, AnimationError> {
        self.ensure(current)?;
        self.ensure(next)?;
        let hop = TrainHopping::new(current, next, self.value(current), self.value(next));
        let observed = std::iter::once(hop.current).chain(hop.next).collect::<Vec<_>>();
        let id = self.insert(Source::TrainHopping(hop), None);
        for train in observed {
            self.attach(id, train);
        }
        tracing::trace!(hop = %id, current = %current, next = %next, "train hopping created");
        Ok(id)
    }

    /// Attach a debug label shown in traces.
    pub fn set_label(&mut self, id: AnimationId, label: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.label = Some(label.into());
        }
    }

    #[must_use]
    pub fn label(&self, id: AnimationId) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.label.as_deref())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current value; 0.0 for unknown ids.
    #[must_use]
    pub fn value(&self, id: AnimationId) -> f64 {
        self.resolve(id).0
    }

    /// Current status; dismissed for unknown ids.
    #[must_use]
    pub fn status(&self, id: AnimationId) -> AnimationStatus {
        self.resolve(id).1
    }

    #[must_use]
    pub fn is_animating(&self, id: AnimationId) -> bool {
        self.status(id).is_animating()
    }

    #[must_use]
    pub fn contains(&self, id: AnimationId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn kind(&self, id: AnimationId) -> Option<AnimationKind> {
        self.nodes.get(&id).map(|n| n.source.kind())
    }

    /// Number of live nodes, sentinels included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get_controller(&self, id: AnimationId) -> Option<&Controller> {
        match self.nodes.get(&id).map(|n| &n.source) {
            Some(Source::Controller(controller)) => Some(controller),
            _ => None,
        }
    }

    /// Parent of a proxy.
    #[must_use]
    pub fn parent(&self, proxy: AnimationId) -> Option<AnimationId> {
        match self.nodes.get(&proxy).map(|n| &n.source) {
            Some(Source::Proxy { parent, .. }) => *parent,
            _ => None,
        }
    }

    #[must_use]
    pub fn get_train_hopping(&self, id: AnimationId) -> Option<&TrainHopping> {
        match self.nodes.get(&id).map(|n| &n.source) {
            Some(Source::TrainHopping(hop)) => Some(hop),
            _ => None,
        }
    }

    /// The train a composite currently reports.
    #[must_use]
    pub fn current_train(&self, id: AnimationId) -> Option<AnimationId> {
        self.get_train_hopping(id).map(TrainHopping::current_train)
    }

    /// The train a composite is still waiting for.
    #[must_use]
    pub fn next_train(&self, id: AnimationId) -> Option<AnimationId> {
        self.get_train_hopping(id).and_then(TrainHopping::next_train)
    }

    /// Value listeners, status listeners and derived nodes registered on `id`.
    #[must_use]
    pub fn listener_count(&self, id: AnimationId) -> usize {
        self.nodes.get(&id).map_or(0, |n| {
            n.value_listeners.len() + n.status_listeners.len() + n.dependents.len()
        })
    }

    /// Nodes deriving their value from `id`.
    #[must_use]
    pub fn dependents(&self, id: AnimationId) -> &[AnimationId] {
        self.nodes
            .get(&id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or_default()
    }

    /// Whether any controller is mid-run.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.nodes
            .values()
            .any(|n| matches!(&n.source, Source::Controller(c) if c.is_running()))
    }

    // =========================================================================
    // Controller driving
    // =========================================================================

    /// Run a controller towards 1.0.
    ///
    /// # Errors
    ///
    /// Fails if `id` is unknown or not a controller.
    pub fn forward(&mut self, id: AnimationId) -> Result<(), AnimationError> {
        self.drive(id, Controller::forward)
    }

    /// Run a controller towards 0.0.
    ///
    /// # Errors
    ///
    /// Fails if `id` is unknown or not a controller.
    pub fn reverse(&mut self, id: AnimationId) -> Result<(), AnimationError> {
        self.drive(id, Controller::reverse)
    }

    /// Jump a controller to `value` and stop it.
    ///
    /// # Errors
    ///
    /// Fails if `id` is unknown or not a controller.
    pub fn set_value(&mut self, id: AnimationId, value: f64) -> Result<(), AnimationError> {
        self.drive(id, |c| c.set_value(value))
    }

    /// Stop a controller where it is.
    ///
    /// # Errors
    ///
    /// Fails if `id` is unknown or not a controller.
    pub fn stop(&mut self, id: AnimationId) -> Result<(), AnimationError> {
        self.drive(id, Controller::stop)
    }

    /// Make controller `id` take over the position and motion of `from`.
    ///
    /// # Errors
    ///
    /// Fails if either id is unknown or not a controller.
    pub fn adopt(&mut self, id: AnimationId, from: AnimationId) -> Result<(), AnimationError> {
        self.ensure(from)?;
        let source = self
            .get_controller(from)
            .cloned()
            .ok_or(AnimationError::NotAController(from))?;
        self.drive(id, |c| c.adopt(&source))
    }

    fn drive(&mut self, id: AnimationId, f: impl FnOnce(&mut Controller)) -> Result<(), AnimationError> {
        match self.nodes.get_mut(&id).map(|n| &mut n.source) {
            Some(Source::Controller(controller)) => f(controller),
            Some(_) => return Err(AnimationError::NotAController(id)),
            None => return Err(AnimationError::UnknownAnimation(id)),
        }
        self.propagate(id);
        Ok(())
    }

    // =========================================================================
    // Proxies
    // =========================================================================

    /// Point a proxy at a new parent, or detach it with `None`.
    ///
    /// A detached proxy holds the value it last read.
    ///
    /// # Errors
    ///
    /// Fails if the proxy or parent is unknown, if `proxy` is not a proxy, or
    /// if `parent` already reads through `proxy`.
    pub fn set_parent(&mut self, proxy: AnimationId, parent: Option<AnimationId>) -> Result<(), AnimationError> {
        let old = match self.nodes.get(&proxy).map(|n| &n.source) {
            Some(Source::Proxy { parent, .. }) => *parent,
            Some(_) => return Err(AnimationError::NotAProxy(proxy)),
            None => return Err(AnimationError::UnknownAnimation(proxy)),
        };
        if old == parent {
            return Ok(());
        }
        if let Some(new_parent) = parent {
            self.ensure(new_parent)?;
            if self.reads_through(new_parent, proxy) {
                return Err(AnimationError::WouldCycle {
                    proxy,
                    parent: new_parent,
                });
            }
        }

        let (value, status) = self.resolve(proxy);
        if let Some(Source::Proxy {
            parent: slot,
            value: held_value,
            status: held_status,
        }) = self.nodes.get_mut(&proxy).map(|n| &mut n.source)
        {
            *slot = parent;
            *held_value = value;
            *held_status = status;
        }
        if let Some(old) = old {
            self.detach(proxy, old);
        }
        if let Some(new_parent) = parent {
            self.attach(proxy, new_parent);
        }
        tracing::trace!(proxy = %proxy, parent = ?parent, "proxy retargeted");
        self.propagate(proxy);
        Ok(())
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a callback fired whenever the value of `id` changes.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::UnknownAnimation`] if `id` does not exist.
    pub fn add_listener(
        &mut self,
        id: AnimationId,
        listener: impl FnMut(f64) + 'static,
    ) -> Result<ListenerId, AnimationError> {
        let listener_id = self.next_listener_id();
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(AnimationError::UnknownAnimation(id))?;
        node.value_listeners.push((listener_id, Box::new(listener)));
        Ok(listener_id)
    }

    /// Register a callback fired whenever the status of `id` changes.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::UnknownAnimation`] if `id` does not exist.
    pub fn add_status_listener(
        &mut self,
        id: AnimationId,
        listener: impl FnMut(AnimationStatus) + 'static,
    ) -> Result<ListenerId, AnimationError> {
        let listener_id = self.next_listener_id();
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(AnimationError::UnknownAnimation(id))?;
        node.status_listeners.push((listener_id, Box::new(listener)));
        Ok(listener_id)
    }

    /// Remove a value or status listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: AnimationId, listener: ListenerId) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        let before = node.value_listeners.len() + node.status_listeners.len();
        node.value_listeners.retain(|(l, _)| *l != listener);
        node.status_listeners.retain(|(l, _)| *l != listener);
        before != node.value_listeners.len() + node.status_listeners.len()
    }

    fn next_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    // =========================================================================
    // Disposal
    // =========================================================================

    /// Dispose a node, dropping its listeners and its registrations on the
    /// nodes it reads from.
    ///
    /// A node still read by a dependent is frozen at its current value and
    /// released once the last dependent lets go. Sentinels and already
    /// disposed nodes are left alone; returns whether anything happened.
    pub fn dispose(&mut self, id: AnimationId) -> bool {
        if id == self.dismissed || id == self.completed {
            return false;
        }
        let (value, status) = self.resolve(id);
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if matches!(node.source, Source::Frozen { .. }) {
            return false;
        }
        node.value_listeners.clear();
        node.status_listeners.clear();
        let observed = node.source.observed();
        if node.dependents.is_empty() {
            self.nodes.remove(&id);
            tracing::trace!(animation = %id, "animation disposed");
        } else {
            node.source = Source::Frozen { value, status };
            tracing::trace!(animation = %id, dependents = node.dependents.len(), "animation frozen");
        }
        for target in observed {
            self.detach(id, target);
        }
        true
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Advance every running controller by `dt` and notify listeners.
    ///
    /// Returns whether any controller is still running afterwards.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let dt = dt.as_secs_f64();
        let mut moved = Vec::new();
        for (id, node) in &mut self.nodes {
            if let Source::Controller(controller) = &mut node.source {
                if controller.tick(dt) {
                    moved.push(*id);
                }
            }
        }
        for id in moved {
            self.propagate(id);
        }
        self.is_ticking()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert(&mut self, source: Source, label: Option<&str>) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                source,
                label: label.map(str::to_owned),
                dependents: Vec::new(),
                value_listeners: Vec::new(),
                status_listeners: Vec::new(),
                last_value: 0.0,
                last_status: AnimationStatus::Dismissed,
            },
        );
        let (value, status) = self.resolve(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.last_value = value;
            node.last_status = status;
        }
        id
    }

    fn ensure(&self, id: AnimationId) -> Result<(), AnimationError> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(AnimationError::UnknownAnimation(id))
        }
    }

    fn resolve(&self, id: AnimationId) -> (f64, AnimationStatus) {
        let mut cursor = id;
        // Chains are acyclic, so a walk longer than the arena is a bug.
        for _ in 0..=self.nodes.len() {
            let Some(node) = self.nodes.get(&cursor) else {
                break;
            };
            match &node.source {
                Source::Controller(controller) => return (controller.value(), controller.status()),
                Source::Constant { value, status }
                | Source::Frozen { value, status }
                | Source::Proxy {
                    parent: None,
                    value,
                    status,
                } => return (*value, *status),
                Source::Proxy {
                    parent: Some(parent),
                    ..
                } => cursor = *parent,
                Source::TrainHopping(hop) => cursor = hop.current,
            }
        }
        (0.0, AnimationStatus::Dismissed)
    }

    /// Whether reading `from` ever passes through `target`.
    fn reads_through(&self, from: AnimationId, target: AnimationId) -> bool {
        let mut stack = vec![from];
        let mut visited = 0usize;
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            visited += 1;
            if visited > self.nodes.len() {
                break;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.source.observed());
            }
        }
        false
    }

    fn attach(&mut self, dependent: AnimationId, on: AnimationId) {
        if let Some(node) = self.nodes.get_mut(&on) {
            if !node.dependents.contains(&dependent) {
                node.dependents.push(dependent);
            }
        }
    }

    fn detach(&mut self, dependent: AnimationId, from: AnimationId) {
        let Some(node) = self.nodes.get_mut(&from) else {
            return;
        };
        node.dependents.retain(|d| *d != dependent);
        // Frozen nodes read from nothing, so releasing one never cascades.
        if node.dependents.is_empty() && matches!(node.source, Source::Frozen { .. }) {
            self.nodes.remove(&from);
            tracing::trace!(animation = %from, "frozen animation released");
        }
    }

    fn check_hop(&mut self, id: AnimationId) {
        let Some((current, next)) = self
            .get_train_hopping(id)
            .and_then(|hop| hop.next.map(|next| (hop.current, next)))
        else {
            return;
        };
        let (current_value, next_value) = (self.value(current), self.value(next));
        let left = match self.nodes.get_mut(&id).map(|n| &mut n.source) {
            Some(Source::TrainHopping(hop)) => hop.check(current_value, next_value),
            _ => None,
        };
        if let Some(left) = left {
            tracing::trace!(hop = %id, from = %left, to = %next, value = next_value, "train hopped");
            self.detach(id, left);
        }
    }

    fn propagate(&mut self, origin: AnimationId) {
        let mut pending = vec![origin];
        let limit = (self.nodes.len() + 1) * 4;
        let mut visits = 0usize;
        while let Some(id) = pending.pop() {
            visits += 1;
            if visits > limit {
                tracing::warn!(origin = %origin, "animation propagation did not converge");
                break;
            }
            self.check_hop(id);
            let (value, status) = self.resolve(id);
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            let value_changed = (value - node.last_value).abs() > f64::EPSILON;
            let status_changed = status != node.last_status;
            node.last_value = value;
            node.last_status = status;
            if value_changed {
                for (_, listener) in &mut node.value_listeners {
                    listener(value);
                }
            }
            if status_changed {
                for (_, listener) in &mut node.status_listeners {
                    listener(status);
                }
            }
            if value_changed || status_changed {
                pending.extend(node.dependents.iter().copied());
            }
        }
    }
}
