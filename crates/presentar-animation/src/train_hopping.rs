//! Train hopping: following one animation until another catches up.
//!
//! A composite starts out reporting its *current train*. Once the *next
//! train* reaches the current one's value it hops aboard and the composite
//! reports the next train from then on. The hop never changes the reported
//! value, which is what keeps a retargeted secondary animation continuous.

use crate::arena::AnimationId;

/// Which way the next train has to travel to catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopMode {
    /// The next train is below the current one; hop once it is at or above.
    Maximize,
    /// The next train is above the current one; hop once it is at or below.
    Minimize,
}

impl HopMode {
    /// Pick the mode for trains currently at `current` and `next`.
    ///
    /// Returns `None` when the values already match and the hop can happen
    /// immediately.
    #[must_use]
    pub fn between(current: f64, next: f64) -> Option<Self> {
        if current == next {
            None
        } else if current > next {
            Some(Self::Maximize)
        } else {
            Some(Self::Minimize)
        }
    }

    /// Whether the next train has caught up.
    #[must_use]
    pub fn should_hop(self, current: f64, next: f64) -> bool {
        match self {
            Self::Maximize => next >= current,
            Self::Minimize => next <= current,
        }
    }
}

/// State of a train-hopping composite node.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainHopping {
    pub(crate) current: AnimationId,
    pub(crate) next: Option<AnimationId>,
    pub(crate) mode: Option<HopMode>,
}

impl TrainHopping {
    pub(crate) fn new(current: AnimationId, next: AnimationId, current_value: f64, next_value: f64) -> Self {
        match HopMode::between(current_value, next_value) {
            None => Self {
                current: next,
                next: None,
                mode: None,
            },
            Some(mode) => Self {
                current,
                next: Some(next),
                mode: Some(mode),
            },
        }
    }

    /// The animation whose value is reported.
    #[must_use]
    pub fn current_train(&self) -> AnimationId {
        self.current
    }

    /// The animation being waited for, until the hop happens.
    #[must_use]
    pub fn next_train(&self) -> Option<AnimationId> {
        self.next
    }

    #[must_use]
    pub fn has_hopped(&self) -> bool {
        self.next.is_none()
    }

    /// Hop if the next train has caught up. Returns the train that was left.
    pub(crate) fn check(&mut self, current_value: f64, next_value: f64) -> Option<AnimationId> {
        let next = self.next?;
        let mode = self.mode?;
        if !mode.should_hop(current_value, next_value) {
            return None;
        }
        let left = self.current;
        self.current = next;
        self.next = None;
        self.mode = None;
        Some(left)
    }
}
