//! Linear animation controller driven by an external clock.

use std::time::Duration;

/// Status of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationStatus {
    /// Stopped at the beginning (value 0.0).
    Dismissed,
    /// Running from 0.0 towards 1.0.
    Forward,
    /// Running from 1.0 towards 0.0.
    Reverse,
    /// Stopped at the end (value 1.0).
    Completed,
}

impl AnimationStatus {
    /// Whether the animation is moving (forward or reverse).
    #[must_use]
    pub const fn is_animating(self) -> bool {
        matches!(self, Self::Forward | Self::Reverse)
    }

    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub const fn is_dismissed(self) -> bool {
        matches!(self, Self::Dismissed)
    }
}

/// Direction the controller last ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    from: f64,
    to: f64,
    elapsed: f64,
    total: f64,
}

/// A value in `0.0..=1.0` animated linearly over a fixed duration.
///
/// Durations are scaled by the remaining distance, so reversing a half-run
/// entrance takes half the reverse duration.
#[derive(Debug, Clone)]
pub struct Controller {
    value: f64,
    status: AnimationStatus,
    direction: Direction,
    duration: Duration,
    reverse_duration: Option<Duration>,
    run: Option<Run>,
}

impl Controller {
    /// Create a dismissed controller.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            value: 0.0,
            status: AnimationStatus::Dismissed,
            direction: Direction::Forward,
            duration,
            reverse_duration: None,
            run: None,
        }
    }

    /// Use a different duration when running in reverse.
    #[must_use]
    pub fn with_reverse_duration(mut self, reverse_duration: Duration) -> Self {
        self.reverse_duration = Some(reverse_duration);
        self
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn status(&self) -> AnimationStatus {
        self.status
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a run is in progress (the clock moves the value).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn reverse_duration(&self) -> Duration {
        self.reverse_duration.unwrap_or(self.duration)
    }

    /// Run towards 1.0.
    pub fn forward(&mut self) {
        self.direction = Direction::Forward;
        self.animate_to(1.0, self.duration);
    }

    /// Run towards 0.0.
    pub fn reverse(&mut self) {
        self.direction = Direction::Reverse;
        self.animate_to(0.0, self.reverse_duration());
    }

    /// Jump to `value` and stop.
    pub fn set_value(&mut self, value: f64) {
        self.run = None;
        self.value = value.clamp(0.0, 1.0);
        self.sync_status();
    }

    /// Stop where the value currently is; the status is left untouched.
    pub fn stop(&mut self) {
        self.run = None;
    }

    /// Take over another controller's position, direction and motion.
    ///
    /// A running source keeps running here, scaled to this controller's own
    /// durations.
    pub fn adopt(&mut self, other: &Self) {
        self.direction = other.direction;
        self.set_value(other.value);
        if other.is_running() {
            match other.direction {
                Direction::Forward => self.forward(),
                Direction::Reverse => self.reverse(),
            }
        }
    }

    /// Advance the clock by `dt` seconds. Returns whether the value or
    /// status moved.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        run.elapsed = (run.elapsed + dt.max(0.0)).min(run.total);
        let t = run.elapsed / run.total;
        self.value = (run.to - run.from).mul_add(t, run.from);
        if run.elapsed >= run.total {
            self.value = run.to;
            self.run = None;
            self.sync_status();
        }
        true
    }

    fn animate_to(&mut self, target: f64, full: Duration) {
        self.run = None;
        let remaining = (target - self.value).abs();
        let total = full.as_secs_f64() * remaining;
        if remaining <= f64::EPSILON || total <= 0.0 {
            self.value = target;
            self.sync_status();
            return;
        }
        self.run = Some(Run {
            from: self.value,
            to: target,
            elapsed: 0.0,
            total,
        });
        self.status = match self.direction {
            Direction::Forward => AnimationStatus::Forward,
            Direction::Reverse => AnimationStatus::Reverse,
        };
    }

    fn sync_status(&mut self) {
        self.status = if self.value <= 0.0 {
            AnimationStatus::Dismissed
        } else if self.value >= 1.0 {
            AnimationStatus::Completed
        } else {
            match self.direction {
                Direction::Forward => AnimationStatus::Forward,
                Direction::Reverse => AnimationStatus::Reverse,
            }
        };
    }
}
