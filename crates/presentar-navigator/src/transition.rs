//! Primary and secondary animations of an animated route.
//!
//! Every animated route owns a primary controller that drives its own
//! entrance and exit, and a secondary proxy that follows the primary of the
//! route directly above it. When the route above is swapped out while its
//! entrance is still running, the proxy is pointed at a train-hopping
//! composite that keeps reporting the old value until the new route's primary
//! catches up. [`Secondary`] records which of these situations applies.

use crate::route::{Animated, RouteId};
use presentar_animation::{AnimationArena, AnimationError, AnimationId, Controller, Easing};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of a route's entrance and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSpec {
    /// Entrance duration in milliseconds.
    pub duration_ms: u64,
    /// Exit duration in milliseconds; the entrance duration when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_duration_ms: Option<u64>,
    /// Curve the renderer applies to the raw progress.
    pub curve: Easing,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::page()
    }
}

impl TransitionSpec {
    /// Full-screen page transition.
    #[must_use]
    pub const fn page() -> Self {
        Self {
            duration_ms: 300,
            reverse_duration_ms: None,
            curve: Easing::FastOutSlowIn,
        }
    }

    /// Popup transition: quick in, quicker out.
    #[must_use]
    pub const fn popup() -> Self {
        Self {
            duration_ms: 150,
            reverse_duration_ms: Some(75),
            curve: Easing::Decelerate,
        }
    }

    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub const fn with_reverse_duration_ms(mut self, reverse_duration_ms: u64) -> Self {
        self.reverse_duration_ms = Some(reverse_duration_ms);
        self
    }

    #[must_use]
    pub const fn with_curve(mut self, curve: Easing) -> Self {
        self.curve = curve;
        self
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    #[must_use]
    pub const fn reverse_duration(&self) -> Duration {
        match self.reverse_duration_ms {
            Some(ms) => Duration::from_millis(ms),
            None => self.duration(),
        }
    }
}

/// What a route's secondary animation is following.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secondary {
    /// The always-dismissed sentinel.
    Dismissed,
    /// The primary animation of `source`.
    Direct { source: RouteId, target: AnimationId },
    /// A composite riding the previous train until `next_train`, the primary
    /// of `source`, catches up.
    Hopping {
        source: RouteId,
        hop: AnimationId,
        next_train: AnimationId,
    },
}

impl Secondary {
    /// Route whose primary the secondary is bound to.
    #[must_use]
    pub const fn source(&self) -> Option<RouteId> {
        match self {
            Self::Dismissed => None,
            Self::Direct { source, .. } | Self::Hopping { source, .. } => Some(*source),
        }
    }

    #[must_use]
    pub const fn is_hopping(&self) -> bool {
        matches!(self, Self::Hopping { .. })
    }
}

/// Animations owned by one route.
#[derive(Debug)]
pub struct TransitionState {
    spec: TransitionSpec,
    primary: AnimationId,
    secondary: AnimationId,
    state: Secondary,
}

impl TransitionState {
    pub(crate) fn new(arena: &mut AnimationArena, route: RouteId, spec: TransitionSpec) -> Self {
        let primary = arena.controller(spec.duration(), Some(spec.reverse_duration()));
        arena.set_label(primary, format!("{route} primary"));
        let secondary = arena.dismissed_proxy();
        arena.set_label(secondary, format!("{route} secondary"));
        Self {
            spec,
            primary,
            secondary,
            state: Secondary::Dismissed,
        }
    }

    #[must_use]
    pub const fn spec(&self) -> &TransitionSpec {
        &self.spec
    }

    #[must_use]
    pub const fn primary(&self) -> AnimationId {
        self.primary
    }

    #[must_use]
    pub const fn secondary(&self) -> AnimationId {
        self.secondary
    }

    #[must_use]
    pub const fn state(&self) -> Secondary {
        self.state
    }

    /// Point the secondary at the primary of the route above.
    ///
    /// `next` is the route above and its primary, or `None` when there is
    /// nothing this route can transition to. A composite created by an earlier
    /// call is disposed once the secondary has moved off it.
    pub(crate) fn update_secondary(
        &mut self,
        arena: &mut AnimationArena,
        next: Option<(RouteId, AnimationId)>,
    ) -> Result<(), AnimationError> {
        let previous_hop = match self.state {
            Secondary::Hopping { hop, .. } => Some(hop),
            _ => None,
        };

        match next {
            None => {
                let dismissed = arena.always_dismissed();
                arena.set_parent(self.secondary, Some(dismissed))?;
                self.state = Secondary::Dismissed;
            }
            Some((source, next_train)) => {
                let parent = arena
                    .parent(self.secondary)
                    .unwrap_or_else(|| arena.always_dismissed());
                let current_train = arena.current_train(parent).unwrap_or(parent);
                if arena.value(current_train) == arena.value(next_train) || !arena.is_animating(next_train) {
                    arena.set_parent(self.secondary, Some(next_train))?;
                    self.state = Secondary::Direct {
                        source,
                        target: next_train,
                    };
                } else {
                    let hop = arena.train_hopping(current_train, next_train)?;
                    arena.set_parent(self.secondary, Some(hop))?;
                    self.state = Secondary::Hopping {
                        source,
                        hop,
                        next_train,
                    };
                }
            }
        }

        if let Some(hop) = previous_hop {
            arena.dispose(hop);
        }
        Ok(())
    }

    /// Finish a hop once the composite is riding the next train, or once the
    /// next train has stopped short. Returns whether the secondary moved.
    pub(crate) fn settle(&mut self, arena: &mut AnimationArena) -> Result<bool, AnimationError> {
        let Secondary::Hopping {
            source,
            hop,
            next_train,
        } = self.state
        else {
            return Ok(false);
        };
        let hopped = arena.current_train(hop).map_or(true, |train| train == next_train);
        let moving = arena.get_controller(next_train).is_some_and(Controller::is_running);
        if !hopped && moving {
            return Ok(false);
        }
        arena.set_parent(self.secondary, Some(next_train))?;
        arena.dispose(hop);
        self.state = Secondary::Direct {
            source,
            target: next_train,
        };
        Ok(true)
    }

    /// Fall back to dismissed if the secondary is bound to `route`.
    pub(crate) fn release_source(&mut self, arena: &mut AnimationArena, route: RouteId) -> Result<bool, AnimationError> {
        if self.state.source() != Some(route) {
            return Ok(false);
        }
        self.update_secondary(arena, None)?;
        Ok(true)
    }

    pub(crate) fn dispose(&mut self, arena: &mut AnimationArena) {
        if let Secondary::Hopping { hop, .. } = self.state {
            arena.dispose(hop);
        }
        arena.dispose(self.secondary);
        arena.dispose(self.primary);
        self.state = Secondary::Dismissed;
    }
}

impl Animated for TransitionState {
    fn primary_animation(&self) -> Option<AnimationId> {
        Some(self.primary)
    }

    fn secondary_animation(&self) -> Option<AnimationId> {
        Some(self.secondary)
    }
}
