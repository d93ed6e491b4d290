#![forbid(unsafe_code)]

//! Frame-driven transition animator.
//!
//! The animator owns at most one transition. The host advances it once per
//! display frame with [`TransitionAnimator::tick`]; each tick returns the
//! events produced during that frame, in order.
//!
//! # Event order
//!
//! For one transition: zero or more [`AnimatorEvent::Frame`]s, then the exact
//! target frame, then [`AnimatorEvent::Completed`]. Completion is always the
//! last event. A cancelled transition emits nothing further. A transition
//! whose interpolation turns non-finite ends with [`AnimatorEvent::Faulted`]
//! instead.
//!
//! # Timeout
//!
//! A transition still running after the timeout (1s by default) completes at
//! its target with `timed_out` set. This is logged at debug level, not
//! reported as an error.

use std::time::Duration;

use feedsheet_core::animation::{Animation, Spring, Tween};
use feedsheet_core::{FrameTolerance, Result, SheetError, VisualFrame};
use tracing::{Span, debug, debug_span, error};

use super::config::MAX_TIMEOUT_MS;
use super::state::{TransitionCurve, TransitionId, TransitionSpec};

/// Pixel speed below which a spring near its target counts as settled.
const SETTLE_SPEED_PX_PER_SEC: f64 = 10.0;

/// Identifies a running transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle(TransitionId);

impl TransitionHandle {
    #[must_use]
    pub const fn id(self) -> TransitionId {
        self.0
    }
}

/// A finished transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    pub handle: TransitionHandle,
    pub spec: TransitionSpec,
    /// The final frame, equal to the target.
    pub frame: VisualFrame,
    /// Whether the hard timeout ended the transition.
    pub timed_out: bool,
    /// Animation time spent on the transition.
    pub elapsed: Duration,
}

/// Output of one animator tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorEvent {
    /// A frame to render.
    Frame(VisualFrame),
    /// The transition reached its target.
    Completed(Completion),
    /// Interpolation produced a non-finite frame. The transition was dropped.
    Faulted {
        spec: TransitionSpec,
        /// Last frame emitted before the fault.
        last_good: VisualFrame,
    },
}

#[derive(Debug, Clone)]
enum Driver {
    Spring(Spring),
    Tween(Tween),
}

impl Driver {
    fn for_curve(curve: TransitionCurve) -> Self {
        match curve {
            TransitionCurve::Timing { duration, easing } => {
                Self::Tween(Tween::new(duration, easing))
            }
            TransitionCurve::Spring(params) => Self::Spring(Spring::new(params)),
        }
    }

    fn animation(&mut self) -> &mut dyn Animation {
        match self {
            Self::Spring(spring) => spring,
            Self::Tween(tween) => tween,
        }
    }

    fn value(&self) -> f64 {
        match self {
            Self::Spring(spring) => spring.value(),
            Self::Tween(tween) => tween.value(),
        }
    }

    /// Whether the transition should end at `frame`.
    fn is_settled(
        &self,
        frame: &VisualFrame,
        from: &VisualFrame,
        to: &VisualFrame,
        tolerance: &FrameTolerance,
    ) -> bool {
        match self {
            Self::Tween(tween) => tween.is_complete(),
            Self::Spring(spring) => {
                if spring.is_complete() {
                    return true;
                }
                let span = from.max_pixel_step(to).max(1.0);
                frame.is_near(to, tolerance)
                    && spring.velocity().abs() * span < SETTLE_SPEED_PX_PER_SEC
            }
        }
    }
}

#[derive(Debug)]
struct Active {
    spec: TransitionSpec,
    from: VisualFrame,
    to: VisualFrame,
    driver: Driver,
    elapsed: Duration,
    span: Span,
}

/// Executes one [`TransitionSpec`] at a time.
#[derive(Debug)]
pub struct TransitionAnimator {
    timeout: Duration,
    tolerance: FrameTolerance,
    active: Option<Active>,
    last_emitted: Option<VisualFrame>,
}

impl TransitionAnimator {
    /// Create an idle animator. `timeout` is capped at
    /// [`MAX_TIMEOUT_MS`].
    #[must_use]
    pub fn new(timeout: Duration, tolerance: FrameTolerance) -> Self {
        Self {
            timeout: timeout.min(Duration::from_millis(MAX_TIMEOUT_MS)),
            tolerance,
            active: None,
            last_emitted: None,
        }
    }

    /// Start animating from `from` to `to` along `spec.curve`.
    ///
    /// Fails with [`SheetError::InvalidState`] while another transition is
    /// running; cancel it first.
    pub fn animate(
        &mut self,
        from: VisualFrame,
        to: VisualFrame,
        spec: TransitionSpec,
    ) -> Result<TransitionHandle> {
        if self.active.is_some() {
            return Err(SheetError::invalid_state(
                "start transition",
                "another transition is running",
            ));
        }
        let span = debug_span!(
            target: "feedsheet.animator",
            "sheet.transition",
            id = %spec.id,
            kind = spec.kind.name(),
            target_state = spec.target.name(),
        );
        span.in_scope(|| debug!(target: "feedsheet.animator", "transition started"));
        self.active = Some(Active {
            spec,
            from,
            to,
            driver: Driver::for_curve(spec.curve),
            elapsed: Duration::ZERO,
            span,
        });
        self.last_emitted = Some(from);
        Ok(TransitionHandle(spec.id))
    }

    /// Advance the running transition by `dt`.
    ///
    /// Returns no events when idle.
    pub fn tick(&mut self, dt: Duration) -> Vec<AnimatorEvent> {
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        let span = active.span.clone();
        let _entered = span.enter();

        active.elapsed = active.elapsed.saturating_add(dt);
        active.driver.animation().tick(dt);
        let raw = active.from.lerp(&active.to, active.driver.value());

        if !raw.is_finite() {
            let spec = active.spec;
            let last_good = self.last_emitted.unwrap_or(active.from);
            error!(
                target: "feedsheet.animator",
                frame = ?raw,
                ?last_good,
                "non-finite transition frame; dropping transition"
            );
            self.active = None;
            return vec![AnimatorEvent::Faulted { spec, last_good }];
        }

        // Springs may overshoot past a channel's range; keep frames renderable.
        let frame = raw.clamped();
        let timed_out = active.elapsed >= self.timeout;
        let settled = active
            .driver
            .is_settled(&frame, &active.from, &active.to, &self.tolerance);
        if !(settled || timed_out) {
            self.last_emitted = Some(frame);
            return vec![AnimatorEvent::Frame(frame)];
        }

        let timed_out = timed_out && !settled;
        if timed_out {
            debug!(
                target: "feedsheet.animator",
                elapsed = ?active.elapsed,
                "transition timed out; completing at target"
            );
        }
        let completion = Completion {
            handle: TransitionHandle(active.spec.id),
            spec: active.spec,
            frame: active.to,
            timed_out,
            elapsed: active.elapsed,
        };
        debug!(
            target: "feedsheet.animator",
            elapsed = ?completion.elapsed,
            timed_out,
            "transition completed"
        );
        self.active = None;
        self.last_emitted = Some(completion.frame);
        vec![
            AnimatorEvent::Frame(completion.frame),
            AnimatorEvent::Completed(completion),
        ]
    }

    /// Stop the running transition and return the last emitted frame (the
    /// start frame if none was emitted yet). `None` when idle.
    pub fn cancel(&mut self) -> Option<VisualFrame> {
        let active = self.active.take()?;
        let frame = self.last_emitted.unwrap_or(active.from);
        active.span.in_scope(|| {
            debug!(
                target: "feedsheet.animator",
                translate_y = frame.translate_y,
                "transition cancelled"
            );
        });
        Some(frame)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// The spec of the running transition.
    #[must_use]
    pub fn active_spec(&self) -> Option<&TransitionSpec> {
        self.active.as_ref().map(|a| &a.spec)
    }

    /// The most recent frame this animator produced or started from.
    #[must_use]
    pub fn last_emitted(&self) -> Option<VisualFrame> {
        self.last_emitted
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
