#![forbid(unsafe_code)]

//! Drag sampling: turns raw touch samples into per-session drag data.
//!
//! [`GestureSampler`] owns at most one [`DragSession`]. A session opens on
//! touch-down, records one [`DragSample`] per accepted touch-move, and closes
//! on touch-up with a [`GestureSummary`] (net distance plus exit velocity) that
//! the sheet state machine resolves into the next state.
//!
//! # Invariants
//!
//! 1. At most one session is active; a second `begin` fails with
//!    [`SheetError::InvalidState`].
//! 2. Samples within a session have non-decreasing timestamps.
//! 3. A session is discarded on `end` or `cancel` and never reused.
//! 4. Velocity is zero whenever the time delta is not positive.
//!
//! # Failure Modes
//!
//! - Non-finite coordinates or timestamps, and timestamps earlier than the
//!   previous sample, are dropped and logged. The session continues.
//! - `sample` with no active session is a no-op.

use tracing::{debug, warn};

use crate::error::{MalformedSample, Result, SheetError};

/// A raw touch position from the host's input system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Vertical position in px, growing downward.
    pub y: f64,
    /// Event time in milliseconds.
    pub timestamp_ms: f64,
}

impl TouchEvent {
    #[must_use]
    pub const fn new(y: f64, timestamp_ms: f64) -> Self {
        Self { y, timestamp_ms }
    }
}

/// One accepted touch-move, relative to the session origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// `y - origin_y`; positive is downward.
    pub delta_y: f64,
    /// Change in `delta_y` per millisecond since the previous sample.
    pub velocity_y: f64,
    /// Timestamp in milliseconds.
    pub t: f64,
}

/// Net result of a finished drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSummary {
    /// Final displacement in px. Zero when the drag never passed the touch slop.
    pub net_delta_y: f64,
    /// Velocity of the final sample in px/ms. Zero when unclaimed.
    pub exit_velocity_y: f64,
    /// Time from touch-down to the final sample.
    pub duration_ms: f64,
    /// Accepted samples, including the release sample.
    pub sample_count: usize,
}

impl GestureSummary {
    /// A summary with the given net distance and exit velocity.
    #[must_use]
    pub fn new(net_delta_y: f64, exit_velocity_y: f64) -> Self {
        Self {
            net_delta_y,
            exit_velocity_y,
            ..Self::default()
        }
    }
}

/// The interval between touch-down and touch-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    origin_y: f64,
    start_timestamp: f64,
    last_delta_y: f64,
    last_timestamp: f64,
    samples: Vec<DragSample>,
    claimed: bool,
}

impl DragSession {
    fn open(origin_y: f64, start_timestamp: f64) -> Self {
        Self {
            origin_y,
            start_timestamp,
            last_delta_y: 0.0,
            last_timestamp: start_timestamp,
            samples: Vec::with_capacity(32),
            claimed: false,
        }
    }

    /// Touch-down position.
    #[must_use]
    pub fn origin_y(&self) -> f64 {
        self.origin_y
    }

    /// Touch-down time in milliseconds.
    #[must_use]
    pub fn start_timestamp(&self) -> f64 {
        self.start_timestamp
    }

    /// Displacement of the latest accepted sample.
    #[must_use]
    pub fn last_delta_y(&self) -> f64 {
        self.last_delta_y
    }

    /// Accepted samples in arrival order.
    #[must_use]
    pub fn samples(&self) -> &[DragSample] {
        &self.samples
    }

    /// Whether the drag has moved beyond the touch slop.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    fn validate(&self, y: f64, t: f64) -> std::result::Result<(), MalformedSample> {
        validate_point(y, t)?;
        if t < self.last_timestamp {
            return Err(MalformedSample::NonMonotonicTimestamp {
                t,
                previous: self.last_timestamp,
            });
        }
        Ok(())
    }

    fn push(&mut self, y: f64, t: f64, touch_slop_px: f64) -> DragSample {
        let delta_y = y - self.origin_y;
        let dt = t - self.last_timestamp;
        let velocity_y = if dt > 0.0 {
            (delta_y - self.last_delta_y) / dt
        } else {
            0.0
        };
        let sample = DragSample {
            delta_y,
            velocity_y,
            t,
        };
        self.samples.push(sample);
        self.last_delta_y = delta_y;
        self.last_timestamp = t;
        if delta_y.abs() > touch_slop_px {
            self.claimed = true;
        }
        sample
    }

    fn summarize(&self) -> GestureSummary {
        let last = self.samples.last();
        let (net_delta_y, exit_velocity_y) = match last {
            Some(s) if self.claimed => (s.delta_y, s.velocity_y),
            _ => (0.0, 0.0),
        };
        GestureSummary {
            net_delta_y,
            exit_velocity_y,
            duration_ms: self.last_timestamp - self.start_timestamp,
            sample_count: self.samples.len(),
        }
    }
}

fn validate_point(y: f64, t: f64) -> std::result::Result<(), MalformedSample> {
    if !y.is_finite() {
        return Err(MalformedSample::NonFiniteCoordinate { y });
    }
    if !t.is_finite() {
        return Err(MalformedSample::NonFiniteTimestamp { t });
    }
    Ok(())
}

/// Converts touch samples into drag sessions and summaries.
#[derive(Debug, Clone, Default)]
pub struct GestureSampler {
    touch_slop_px: f64,
    session: Option<DragSession>,
    dropped: u64,
}

impl GestureSampler {
    /// Create a sampler. Drags shorter than `touch_slop_px` are treated as
    /// taps: they never move the sheet and summarize to zero.
    #[must_use]
    pub fn new(touch_slop_px: f64) -> Self {
        Self {
            touch_slop_px: if touch_slop_px.is_finite() {
                touch_slop_px.max(0.0)
            } else {
                0.0
            },
            session: None,
            dropped: 0,
        }
    }

    /// Open a drag session at `y`.
    pub fn begin(&mut self, y: f64, timestamp_ms: f64) -> Result<()> {
        if self.session.is_some() {
            return Err(SheetError::invalid_state(
                "begin drag",
                "a drag session is already active",
            ));
        }
        if let Err(err) = validate_point(y, timestamp_ms) {
            self.dropped += 1;
            warn!(
                target: "feedsheet.gesture",
                error = %err,
                dropped_total = self.dropped,
                "rejecting malformed touch-down"
            );
            return Err(err.into());
        }
        self.session = Some(DragSession::open(y, timestamp_ms));
        debug!(target: "feedsheet.gesture", origin_y = y, t = timestamp_ms, "drag session opened");
        Ok(())
    }

    /// Record a touch-move. Returns the new sample, or `None` when no session
    /// is active or the sample was malformed (dropped and logged).
    pub fn sample(&mut self, y: f64, timestamp_ms: f64) -> Option<DragSample> {
        match self.try_sample(y, timestamp_ms) {
            Ok(sample) => sample,
            Err(err) => {
                self.dropped += 1;
                warn!(
                    target: "feedsheet.gesture",
                    error = %err,
                    dropped_total = self.dropped,
                    "dropping malformed touch sample"
                );
                None
            }
        }
    }

    /// Like [`sample`](Self::sample) but reports malformed input instead of
    /// logging it. The session is unaffected either way.
    pub fn try_sample(&mut self, y: f64, timestamp_ms: f64) -> Result<Option<DragSample>> {
        let touch_slop_px = self.touch_slop_px;
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        session.validate(y, timestamp_ms)?;
        Ok(Some(session.push(y, timestamp_ms, touch_slop_px)))
    }

    /// Close the session, recording the release position if well-formed.
    pub fn end(&mut self, y: f64, timestamp_ms: f64) -> Result<GestureSummary> {
        let touch_slop_px = self.touch_slop_px;
        let Some(mut session) = self.session.take() else {
            return Err(SheetError::invalid_state(
                "end drag",
                "no drag session is active",
            ));
        };
        let repeat = session
            .samples
            .last()
            .is_some_and(|s| s.t == timestamp_ms && s.delta_y == y - session.origin_y);
        if !repeat {
            match session.validate(y, timestamp_ms) {
                Ok(()) => {
                    session.push(y, timestamp_ms, touch_slop_px);
                }
                Err(err) => {
                    self.dropped += 1;
                    warn!(
                        target: "feedsheet.gesture",
                        error = %err,
                        dropped_total = self.dropped,
                        "dropping malformed release sample"
                    );
                }
            }
        }
        let summary = session.summarize();
        debug!(
            target: "feedsheet.gesture",
            net_delta_y = summary.net_delta_y,
            exit_velocity_y = summary.exit_velocity_y,
            samples = summary.sample_count,
            "drag session ended"
        );
        Ok(summary)
    }

    /// Discard the active session without a summary. Returns whether one
    /// was active.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.session.take().is_some();
        if cancelled {
            debug!(target: "feedsheet.gesture", "drag session cancelled");
        }
        cancelled
    }

    /// Whether a session is active.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Displacement to forward to the live visual mapping.
    ///
    /// Only downward motion moves the sheet; upward motion is kept in the
    /// samples (the state machine reads it as expansion intent) but forwarded
    /// as zero. Before the drag is claimed this is always zero.
    #[must_use]
    pub fn live_delta(&self) -> f64 {
        match &self.session {
            Some(s) if s.claimed => s.last_delta_y.max(0.0),
            _ => 0.0,
        }
    }

    /// Malformed samples dropped over the sampler's lifetime.
    #[must_use]
    pub fn dropped_samples(&self) -> u64 {
        self.dropped
    }

    /// The configured touch slop in px.
    #[must_use]
    pub fn touch_slop_px(&self) -> f64 {
        self.touch_slop_px
    }
}
