#![forbid(unsafe_code)]

//! Converts display-refresh timestamps into per-frame deltas.

use std::time::Duration;

use web_time::Instant;

/// Tracks the previous frame instant and reports the time since.
///
/// The first call after construction or [`reset`](FrameClock::reset) reports
/// [`Duration::ZERO`]. Deltas are not capped: a starved frame loop reports
/// the full gap so that timeouts measured in animation time stay aligned with
/// wall time.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    frames: u64,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` and return the time since the previous frame.
    pub fn advance_to(&mut self, now: Instant) -> Duration {
        let dt = match self.last {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.frames += 1;
        dt
    }

    /// Forget the previous instant.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Number of frames observed.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
