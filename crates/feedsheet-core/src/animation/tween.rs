#![forbid(unsafe_code)]

//! Time-based eased progress from 0 to 1 over a fixed duration.

use std::time::Duration;

use super::{Animation, Easing};

/// Eased progress over a fixed duration.
///
/// A zero duration completes on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    #[must_use]
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Linear (un-eased) fraction of the duration that has elapsed.
    #[must_use]
    pub fn linear_progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        self.easing.apply(self.linear_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_duration() {
        let mut tween = Tween::new(Duration::from_millis(200), Easing::EaseInOut);
        for _ in 0..12 {
            tween.tick(Duration::from_millis(16));
        }
        assert!(!tween.is_complete());
        tween.tick(Duration::from_millis(16));
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn zero_duration_is_immediately_complete() {
        let tween = Tween::new(Duration::ZERO, Easing::Linear);
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn elapsed_never_exceeds_duration() {
        let mut tween = Tween::new(Duration::from_millis(100), Easing::Linear);
        tween.tick(Duration::from_secs(5));
        assert_eq!(tween.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn linear_midpoint() {
        let mut tween = Tween::new(Duration::from_millis(100), Easing::Linear);
        tween.tick(Duration::from_millis(50));
        assert!((tween.value() - 0.5).abs() < 1e-12);
        tween.reset();
        assert_eq!(tween.value(), 0.0);
    }
}
