#![forbid(unsafe_code)]

//! Animation primitives: the [`Animation`] trait, easing curves, springs,
//! time-based tweens, and a frame clock.
//!
//! Every animation here produces a normalized progress value. Callers map
//! progress onto concrete values (for the sheet, by interpolating two
//! [`VisualFrame`](crate::frame::VisualFrame)s), so one driver can move
//! several channels in lockstep.
//!
//! # Invariants
//!
//! 1. `tick()` with a zero duration never changes `value()`.
//! 2. Once `is_complete()` is true it stays true until `reset()`.
//! 3. Easing curves map 0 to 0 and 1 to 1.

use std::time::Duration;

pub mod clock;
pub mod spring;
pub mod tween;

pub use clock::FrameClock;
pub use spring::{Spring, SpringParams};
pub use tween::Tween;

/// A value that evolves over time toward completion.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has finished.
    fn is_complete(&self) -> bool;

    /// Current normalized progress. Springs may report values outside
    /// `[0, 1]` while overshooting.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Easing curve for time-based transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Cubic acceleration.
    EaseIn,
    /// Cubic deceleration. Suits entrances.
    #[default]
    EaseOut,
    /// Cubic S-curve. The default for timed exits.
    EaseInOut,
}

impl Easing {
    /// Apply the curve to `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ];

    #[test]
    fn easing_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn easing_clamps_input() {
        for easing in ALL {
            assert_eq!(easing.apply(-3.0), easing.apply(0.0));
            assert_eq!(easing.apply(7.0), easing.apply(1.0));
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        let a = Easing::EaseInOut.apply(0.25);
        let b = Easing::EaseInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 1e-12);
    }
}
