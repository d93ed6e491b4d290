#![forbid(unsafe_code)]

//! Damped spring driving normalized progress from 0 toward 1.
//!
//! The spring follows the damped harmonic oscillator with unit mass:
//!
//!   a = -tension × (x - 1) - friction × v
//!
//! - Critically damped (`friction = 2√tension`): fastest settle without
//!   overshoot. This is what sheet expand/collapse/snap-back use.
//! - Underdamped (`friction < 2√tension`): overshoots, then settles.
//!
//! # Integration
//!
//! Semi-implicit Euler in steps of at most 4ms. A long frame is split into
//! several steps, so dropped frames do not destabilize stiff springs.
//!
//! # Invariants
//!
//! 1. Tension is at least [`MIN_TENSION`]; friction is non-negative.
//! 2. A spring at rest stays at exactly 1.0 until `reset()`.
//!
//! # Failure Modes
//!
//! - Zero friction never settles; the caller's timeout must end it.

use std::time::Duration;

use super::Animation;

/// Maximum integration step in seconds.
const MAX_STEP_SECS: f64 = 0.004;

/// Position error below which the spring may rest.
const REST_POSITION: f64 = 0.0005;

/// Speed (progress per second) below which the spring may rest.
const REST_VELOCITY: f64 = 0.005;

/// Lower bound on tension.
pub const MIN_TENSION: f64 = 0.1;

/// Tension/friction pair describing a spring curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringParams {
    /// Restoring force per unit of displacement.
    pub tension: f64,
    /// Drag per unit of velocity.
    pub friction: f64,
}

impl SpringParams {
    /// A critically damped spring with the given tension.
    #[must_use]
    pub fn critical(tension: f64) -> Self {
        let tension = tension.max(MIN_TENSION);
        Self {
            tension,
            friction: 2.0 * tension.sqrt(),
        }
    }

    /// Damping ratio: 1.0 is critical, below 1.0 oscillates.
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.friction / (2.0 * self.tension.max(MIN_TENSION).sqrt())
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::critical(170.0)
    }
}

/// A spring producing normalized progress.
#[derive(Debug, Clone)]
pub struct Spring {
    params: SpringParams,
    position: f64,
    velocity: f64,
    initial_velocity: f64,
    at_rest: bool,
}

impl Spring {
    /// A spring at progress 0, at rest velocity, heading for 1.
    #[must_use]
    pub fn new(params: SpringParams) -> Self {
        Self {
            params: SpringParams {
                tension: params.tension.max(MIN_TENSION),
                friction: params.friction.max(0.0),
            },
            position: 0.0,
            velocity: 0.0,
            initial_velocity: 0.0,
            at_rest: false,
        }
    }

    /// Start with a velocity in progress units per second (builder pattern).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };
        self.velocity = velocity;
        self.initial_velocity = velocity;
        self
    }

    /// The curve parameters.
    #[must_use]
    pub fn params(&self) -> SpringParams {
        self.params
    }

    /// Current progress (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity in progress units per second.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - 1.0;
        let acceleration =
            -self.params.tension * displacement - self.params.friction * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            self.step(h);
            remaining -= h;
        }
        if (self.position - 1.0).abs() < REST_POSITION && self.velocity.abs() < REST_VELOCITY {
            self.position = 1.0;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn value(&self) -> f64 {
        self.position
    }

    fn reset(&mut self) {
        self.position = 0.0;
        self.velocity = self.initial_velocity;
        self.at_rest = false;
    }
}
