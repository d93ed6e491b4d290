#![forbid(unsafe_code)]

//! Deterministic touch scripts for driving a [`SheetHost`].
//!
//! A [`GestureScript`] is a flat list of [`ScriptStep`]s with synthetic
//! timestamps advancing one display frame per step. Scripts are built either
//! by hand with the builder methods or generated from a seed by
//! [`gesture_storm`].
//!
//! # Storm Patterns
//!
//! | Step | Weight |
//! |------|--------|
//! | drag (press, random walk, release or cancel) | 6 |
//! | idle frames | 3 |
//! | command (expand, collapse, close) | 1 |
//!
//! Storms occasionally inject non-finite or backwards-in-time samples so the
//! drop path is exercised.

use std::time::Duration;

use feedsheet_core::{Result, TouchEvent};
use feedsheet_widgets::{SheetHost, TransitionSpec};
use tracing::trace;

/// Default synthetic frame length.
pub const FRAME_MS: f64 = 16.0;

/// A direct command to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Expand,
    Collapse,
    Close,
    Present,
}

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    Start(TouchEvent),
    Move(TouchEvent),
    End(TouchEvent),
    Cancel,
    Tick(Duration),
    Command(Command),
}

impl ScriptStep {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Move(_) => "move",
            Self::End(_) => "end",
            Self::Cancel => "cancel",
            Self::Tick(_) => "tick",
            Self::Command(_) => "command",
        }
    }
}

/// Builder and player for touch scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureScript {
    steps: Vec<ScriptStep>,
    y: f64,
    t: f64,
    frame_ms: f64,
}

impl Default for GestureScript {
    fn default() -> Self {
        Self::new(400.0)
    }
}

impl GestureScript {
    /// Empty script with the finger resting at `y`, time 0.
    #[must_use]
    pub fn new(y: f64) -> Self {
        Self {
            steps: Vec::new(),
            y,
            t: 0.0,
            frame_ms: FRAME_MS,
        }
    }

    /// Use a different frame length for timestamps and ticks.
    #[must_use]
    pub fn frame_ms(mut self, frame_ms: f64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    /// Finger down at the current position.
    #[must_use]
    pub fn press(mut self) -> Self {
        self.steps.push(ScriptStep::Start(TouchEvent::new(self.y, self.t)));
        self
    }

    /// Move linearly by `dy` over `moves` samples, one per frame.
    #[must_use]
    pub fn drag_by(mut self, dy: f64, moves: usize) -> Self {
        let moves = moves.max(1);
        let start = self.y;
        for i in 1..=moves {
            self.t += self.frame_ms;
            self.y = start + dy * i as f64 / moves as f64;
            self.steps.push(ScriptStep::Move(TouchEvent::new(self.y, self.t)));
        }
        self
    }

    /// Append a raw move sample, well-formed or not. Does not update the
    /// script's position or clock.
    #[must_use]
    pub fn raw_move(mut self, y: f64, timestamp_ms: f64) -> Self {
        self.steps.push(ScriptStep::Move(TouchEvent::new(y, timestamp_ms)));
        self
    }

    /// Finger up one frame later at the current position.
    #[must_use]
    pub fn release(mut self) -> Self {
        self.t += self.frame_ms;
        self.steps.push(ScriptStep::End(TouchEvent::new(self.y, self.t)));
        self
    }

    /// Platform touch cancel.
    #[must_use]
    pub fn cancel(mut self) -> Self {
        self.steps.push(ScriptStep::Cancel);
        self
    }

    /// Advance `frames` display frames.
    #[must_use]
    pub fn wait(mut self, frames: usize) -> Self {
        let dt = frame_duration(self.frame_ms);
        for _ in 0..frames {
            self.t += self.frame_ms;
            self.steps.push(ScriptStep::Tick(dt));
        }
        self
    }

    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.steps.push(ScriptStep::Command(command));
        self
    }

    /// Press, drag by `dy`, release.
    #[must_use]
    pub fn flick(self, dy: f64, moves: usize) -> Self {
        self.press().drag_by(dy, moves).release()
    }

    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Feed every step to `host`, stopping at the first error.
    ///
    /// Returns the transitions started along the way.
    pub fn play(&self, host: &mut SheetHost) -> Result<Vec<TransitionSpec>> {
        let mut started = Vec::new();
        for step in &self.steps {
            if let Some(spec) = apply(host, step)? {
                started.push(spec);
            }
        }
        Ok(started)
    }

    /// Feed every step to `host`, collecting errors instead of stopping.
    pub fn play_lenient(&self, host: &mut SheetHost) -> PlaybackReport {
        let mut report = PlaybackReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            match apply(host, step) {
                Ok(Some(spec)) => report.started.push(spec),
                Ok(None) => {}
                Err(err) => {
                    trace!(index, step = step.name(), error = %err, "script step rejected");
                    report.rejected.push((index, err));
                }
            }
            report.steps_run += 1;
        }
        report
    }
}

/// Result of [`GestureScript::play_lenient`].
#[derive(Debug, Default)]
pub struct PlaybackReport {
    pub steps_run: usize,
    pub started: Vec<TransitionSpec>,
    /// Step index and error for every rejected step.
    pub rejected: Vec<(usize, feedsheet_core::SheetError)>,
}

fn apply(host: &mut SheetHost, step: &ScriptStep) -> Result<Option<TransitionSpec>> {
    match *step {
        ScriptStep::Start(event) => host.handle_touch_start(event).map(|()| None),
        ScriptStep::Move(event) => host.handle_touch_move(event).map(|()| None),
        ScriptStep::End(event) => host.handle_touch_end(event).map(Some),
        ScriptStep::Cancel => host.handle_touch_cancel().map(|_| None),
        ScriptStep::Tick(dt) => host.tick(dt).map(|()| None),
        ScriptStep::Command(Command::Expand) => host.request_expand(),
        ScriptStep::Command(Command::Collapse) => host.request_collapse(),
        ScriptStep::Command(Command::Close) => host.request_close(),
        ScriptStep::Command(Command::Present) => host.present().map(Some),
    }
}

fn frame_duration(frame_ms: f64) -> Duration {
    if frame_ms.is_finite() && frame_ms > 0.0 {
        Duration::from_micros((frame_ms * 1000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// Tick `host` until no transition is running, at most `max_frames` times.
///
/// Returns the number of frames ticked.
pub fn settle(host: &mut SheetHost, max_frames: usize) -> Result<usize> {
    let dt = frame_duration(FRAME_MS);
    let mut frames = 0;
    while host.is_animating() && frames < max_frames {
        host.tick(dt)?;
        frames += 1;
    }
    Ok(frames)
}

// ============================================================================
// Storms
// ============================================================================

/// Simple deterministic PRNG (xorshift64).
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn below(&mut self, max: u64) -> u64 {
        if max == 0 { 0 } else { self.next() % max }
    }

    /// Uniform in `[-span, span]`.
    fn signed(&mut self, span: f64) -> f64 {
        let unit = (self.next() >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * span
    }
}

/// Generate a random but reproducible mix of drags, idle frames, and
/// commands.
#[must_use]
pub fn gesture_storm(seed: u64, actions: usize) -> GestureScript {
    let mut rng = Rng::new(seed);
    let mut script = GestureScript::new(400.0);
    for _ in 0..actions {
        match rng.below(10) {
            0..=5 => {
                script = script.press();
                for _ in 0..=rng.below(8) {
                    if rng.below(20) == 0 {
                        let (y, t) = (script.y, script.t);
                        script = if rng.below(2) == 0 {
                            script.raw_move(f64::NAN, t)
                        } else {
                            script.raw_move(y, t - 100.0)
                        };
                    }
                    let dy = rng.signed(120.0);
                    script = script.drag_by(dy, 1);
                }
                script = if rng.below(8) == 0 {
                    script.cancel()
                } else {
                    script.release()
                };
            }
            6..=8 => {
                let frames = 1 + rng.below(20) as usize;
                script = script.wait(frames);
            }
            _ => {
                let command = match rng.below(3) {
                    0 => Command::Expand,
                    1 => Command::Collapse,
                    _ => Command::Close,
                };
                script = script.command(command);
            }
        }
    }
    script
}
