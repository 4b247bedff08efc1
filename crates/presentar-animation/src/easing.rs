//! Easing curves applied to raw animation progress.
//!
//! Controllers always run linearly from 0.0 to 1.0; a route's transition picks
//! one of these curves and the renderer maps the raw value through it.

use serde::{Deserialize, Serialize};

/// Bisection tolerance for the cubic bezier solver.
const CUBIC_ERROR_BOUND: f64 = 0.001;

/// Standard easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// No easing.
    Linear,
    /// Quadratic ease in (slow start).
    EaseIn,
    /// Quadratic ease out (slow end).
    EaseOut,
    /// Quadratic ease in and out.
    EaseInOut,
    /// Cubic ease out.
    CubicOut,
    /// Cubic ease in and out.
    CubicInOut,
    /// Quadratic deceleration, used by popups.
    Decelerate,
    /// Material standard curve, `cubic-bezier(0.4, 0.0, 0.2, 1.0)`.
    #[default]
    FastOutSlowIn,
}

impl Easing {
    /// Map normalized progress (clamped to `0.0..=1.0`) through the curve.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = 1.0 - t;
                    1.0 - 2.0 * u * u
                }
            }
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (2.0 - 2.0 * t).powi(3) / 2.0
                }
            }
            Self::Decelerate => {
                let u = 1.0 - t;
                1.0 - u * u
            }
            Self::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
        }
    }
}

fn evaluate_cubic(a: f64, b: f64, m: f64) -> f64 {
    let inv = 1.0 - m;
    3.0 * a * inv * inv * m + 3.0 * b * inv * m * m + m * m * m
}

/// Solve a unit cubic bezier with control points `(x1, y1)` and `(x2, y2)`.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let mut start = 0.0;
    let mut end = 1.0;
    let mut midpoint = 0.5;
    for _ in 0..64 {
        midpoint = (start + end) / 2.0;
        let estimate = evaluate_cubic(x1, x2, midpoint);
        if (t - estimate).abs() < CUBIC_ERROR_BOUND {
            break;
        }
        if estimate < t {
            start = midpoint;
        } else {
            end = midpoint;
        }
    }
    evaluate_cubic(y1, y2, midpoint)
}
