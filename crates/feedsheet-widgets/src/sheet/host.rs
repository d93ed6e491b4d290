#![forbid(unsafe_code)]

//! Composition root: one sampler, one state machine, one animator.
//!
//! # Frame ownership
//!
//! The current [`VisualFrame`] has one producer at a time:
//!
//! - while a finger is down, the gesture path (baseline + mapped delta);
//! - while a transition runs, the animator;
//! - after an animator fault, a one-off recovery frame.
//!
//! A touch-down during a transition cancels the animator first and adopts
//! its last frame as the drag baseline, so the first live frame equals the
//! last animated one.
//!
//! # Lifecycle
//!
//! Reaching [`SheetState::Closed`] fires `on_dismiss` exactly once and
//! releases the components. [`SheetHost::dispose`] releases them without
//! firing it. Either way every later mutation fails with
//! [`SheetError::InvalidState`].

use std::fmt;
use std::time::Duration;

use feedsheet_core::animation::FrameClock;
use feedsheet_core::{
    GestureSampler, GestureSummary, Result, SheetError, TouchEvent, VisualFrame,
};
use tracing::{debug, warn};
use web_time::Instant;

use super::animator::{AnimatorEvent, TransitionAnimator};
use super::config::SheetConfig;
use super::progress::ProgressMapper;
use super::state::{SheetState, SheetStateMachine, StateChange, TransitionSpec};

/// Items and text input hosted inside the sheet.
pub trait SheetContent {
    /// Number of items in the list.
    fn item_count(&self) -> usize;

    /// Rendered text for the item at `index`.
    fn render_item(&self, index: usize) -> String;

    /// Called with trimmed, non-empty text from the input box.
    fn on_submit_text(&mut self, text: &str);
}

/// Which producer wrote a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSource {
    /// Live drag.
    Gesture,
    /// Running transition.
    Animator,
    /// Snap to a stable state after an animator fault.
    Recovery,
}

type StateListener = Box<dyn FnMut(SheetState)>;
type ExpandListener = Box<dyn FnMut(bool)>;
type DismissCallback = Box<dyn FnMut()>;
type FrameListener = Box<dyn FnMut(&VisualFrame, FrameSource)>;

#[derive(Default)]
struct Listeners {
    state: Vec<StateListener>,
    expand: Vec<ExpandListener>,
    dismiss: Vec<DismissCallback>,
    frame: Vec<FrameListener>,
}

impl Listeners {
    fn frame(&mut self, frame: &VisualFrame, source: FrameSource) {
        for listener in &mut self.frame {
            listener(frame, source);
        }
    }
}

struct Parts {
    sampler: GestureSampler,
    machine: SheetStateMachine,
    animator: TransitionAnimator,
}

/// Live drag bookkeeping.
#[derive(Debug, Clone, Copy)]
struct DragBaseline {
    frame: VisualFrame,
    state: SheetState,
}

/// An interactive bottom sheet.
pub struct SheetHost {
    config: SheetConfig,
    mapper: ProgressMapper,
    parts: Option<Parts>,
    frame: VisualFrame,
    drag: Option<DragBaseline>,
    last_state: SheetState,
    clock: FrameClock,
    listeners: Listeners,
    content: Option<Box<dyn SheetContent>>,
    dismissed: bool,
}

impl SheetHost {
    /// Create a sheet at rest in `config.initial_state`.
    ///
    /// Fails with [`SheetError::InvalidConfig`] if the config is invalid.
    pub fn new(config: SheetConfig) -> Result<Self> {
        let config = config.validated()?;
        let mapper = ProgressMapper::new(config.geometry, config.radii);
        let parts = Parts {
            sampler: GestureSampler::new(config.touch_slop_px),
            machine: SheetStateMachine::new(&config),
            animator: TransitionAnimator::new(config.motion.timeout(), config.motion.tolerance),
        };
        Ok(Self {
            frame: mapper.rest_frame(config.initial_state),
            last_state: config.initial_state,
            config,
            mapper,
            parts: Some(parts),
            drag: None,
            clock: FrameClock::new(),
            listeners: Listeners::default(),
            content: None,
            dismissed: false,
        })
    }

    /// Attach the hosted content (builder pattern).
    #[must_use]
    pub fn with_content(mut self, content: impl SheetContent + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    /// Replace the hosted content.
    pub fn set_content(&mut self, content: impl SheetContent + 'static) {
        self.content = Some(Box::new(content));
    }

    /// Called with the new state after every confirmed change.
    pub fn on_state_change(&mut self, listener: impl FnMut(SheetState) + 'static) -> &mut Self {
        self.listeners.state.push(Box::new(listener));
        self
    }

    /// Called when the sheet enters or leaves [`SheetState::Full`].
    pub fn on_expand_changed(&mut self, listener: impl FnMut(bool) + 'static) -> &mut Self {
        self.listeners.expand.push(Box::new(listener));
        self
    }

    /// Called once when the sheet closes.
    pub fn on_dismiss(&mut self, callback: impl FnMut() + 'static) -> &mut Self {
        self.listeners.dismiss.push(Box::new(callback));
        self
    }

    /// Called with every frame written, and who wrote it.
    pub fn on_frame(
        &mut self,
        listener: impl FnMut(&VisualFrame, FrameSource) + 'static,
    ) -> &mut Self {
        self.listeners.frame.push(Box::new(listener));
        self
    }

    /// The frame to render now.
    #[must_use]
    pub fn current_frame(&self) -> VisualFrame {
        self.frame
    }

    /// Last confirmed state.
    #[must_use]
    pub fn state(&self) -> SheetState {
        self.parts
            .as_ref()
            .map_or(self.last_state, |p| p.machine.state())
    }

    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.parts.as_ref().is_some_and(|p| p.animator.is_running())
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.parts.as_ref().is_some_and(|p| p.sampler.is_active())
    }

    /// Whether the components have been released (closed or disposed).
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.parts.is_none()
    }

    /// Malformed touch samples dropped so far.
    #[must_use]
    pub fn dropped_samples(&self) -> u64 {
        self.parts.as_ref().map_or(0, |p| p.sampler.dropped_samples())
    }

    /// Finger down. Cancels a running transition and takes over the frame.
    pub fn handle_touch_start(&mut self, event: TouchEvent) -> Result<()> {
        let parts = parts_mut(&mut self.parts, "start drag")?;
        parts.sampler.begin(event.y, event.timestamp_ms)?;
        if let Some(frame) = parts.animator.cancel() {
            parts.machine.interrupt();
            self.frame = frame;
        }
        self.drag = Some(DragBaseline {
            frame: self.frame,
            state: parts.machine.state(),
        });
        Ok(())
    }

    /// Finger moved. Updates the live frame; malformed samples are dropped.
    pub fn handle_touch_move(&mut self, event: TouchEvent) -> Result<()> {
        let parts = parts_mut(&mut self.parts, "track drag")?;
        if parts.sampler.sample(event.y, event.timestamp_ms).is_none() {
            return Ok(());
        }
        let Some(baseline) = self.drag else {
            return Ok(());
        };
        let delta = parts.sampler.live_delta();
        let live = self.mapper.map(delta, baseline.state);
        let origin = self.mapper.map(0.0, baseline.state);
        self.frame = (baseline.frame + (live - origin)).clamped();
        self.listeners.frame(&self.frame, FrameSource::Gesture);
        Ok(())
    }

    /// Finger up. Resolves the drag and starts the resulting transition.
    pub fn handle_touch_end(&mut self, event: TouchEvent) -> Result<TransitionSpec> {
        let parts = parts_mut(&mut self.parts, "end drag")?;
        let summary = parts.sampler.end(event.y, event.timestamp_ms)?;
        self.drag = None;
        let spec = parts.machine.release(&summary)?;
        self.start(spec)?;
        Ok(spec)
    }

    /// Touch cancelled by the platform. Snaps back to the current state.
    ///
    /// Returns whether a drag was active.
    pub fn handle_touch_cancel(&mut self) -> Result<bool> {
        let parts = parts_mut(&mut self.parts, "cancel drag")?;
        if !parts.sampler.cancel() {
            return Ok(false);
        }
        self.drag = None;
        let spec = parts.machine.release(&GestureSummary::default())?;
        self.start(spec)?;
        Ok(true)
    }

    /// Advance by the time since the previous display frame.
    pub fn advance_to(&mut self, now: Instant) -> Result<()> {
        let dt = self.clock.advance_to(now);
        self.tick(dt)
    }

    /// Advance the running transition by `dt` and dispatch its events.
    pub fn tick(&mut self, dt: Duration) -> Result<()> {
        let events = parts_mut(&mut self.parts, "tick")?.animator.tick(dt);
        for event in events {
            match event {
                AnimatorEvent::Frame(frame) => {
                    self.frame = frame;
                    self.listeners.frame(&self.frame, FrameSource::Animator);
                }
                AnimatorEvent::Completed(completion) => {
                    let change = parts_mut(&mut self.parts, "tick")?
                        .machine
                        .complete(completion.spec.id)?;
                    if let Some(change) = change {
                        self.apply_change(change);
                    }
                }
                AnimatorEvent::Faulted { spec, last_good } => {
                    self.recover(spec, last_good)?;
                }
            }
        }
        Ok(())
    }

    /// Expand to full. Returns the started transition, or `None` if the
    /// sheet is not headed for [`SheetState::Partial`].
    pub fn request_expand(&mut self) -> Result<Option<TransitionSpec>> {
        let spec = parts_mut(&mut self.parts, "expand")?.machine.request_expand()?;
        self.run_command(spec)
    }

    /// Collapse to partial. Returns `None` unless headed for
    /// [`SheetState::Full`].
    pub fn request_collapse(&mut self) -> Result<Option<TransitionSpec>> {
        let spec = parts_mut(&mut self.parts, "collapse")?.machine.request_collapse()?;
        self.run_command(spec)
    }

    /// Close the sheet. Returns `None` if a close is already running.
    pub fn request_close(&mut self) -> Result<Option<TransitionSpec>> {
        let spec = parts_mut(&mut self.parts, "close")?.machine.request_close()?;
        self.run_command(spec)
    }

    /// Play the mount transition: slide up from below the screen into the
    /// current state.
    pub fn present(&mut self) -> Result<TransitionSpec> {
        let parts = parts_mut(&mut self.parts, "present")?;
        if parts.sampler.is_active() {
            return Err(SheetError::invalid_state("present", "a drag is active"));
        }
        let spec = parts.machine.open()?;
        self.frame = self.mapper.hidden_frame(spec.target);
        self.listeners.frame(&self.frame, FrameSource::Animator);
        self.start(spec)?;
        Ok(spec)
    }

    /// Render every content item. Empty without content.
    pub fn render_content(&self) -> Result<Vec<String>> {
        if self.parts.is_none() {
            return Err(SheetError::invalid_state("render content", "the sheet is released"));
        }
        Ok(self
            .content
            .as_ref()
            .map(|c| (0..c.item_count()).map(|i| c.render_item(i)).collect())
            .unwrap_or_default())
    }

    /// Forward text from the input box. Blank input is ignored.
    ///
    /// Returns whether the text was delivered.
    pub fn submit_text(&mut self, raw: &str) -> Result<bool> {
        if self.parts.is_none() {
            return Err(SheetError::invalid_state("submit text", "the sheet is released"));
        }
        let text = raw.trim();
        if text.is_empty() {
            return Ok(false);
        }
        match self.content.as_mut() {
            Some(content) => {
                content.on_submit_text(text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Release the components without firing `on_dismiss`. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(parts) = self.parts.take() {
            self.last_state = parts.machine.state();
            debug!(target: "feedsheet.sheet", state = self.last_state.name(), "sheet disposed");
        }
        self.drag = None;
        self.content = None;
        self.listeners = Listeners::default();
    }

    fn run_command(&mut self, spec: Option<TransitionSpec>) -> Result<Option<TransitionSpec>> {
        let Some(spec) = spec else {
            return Ok(None);
        };
        let parts = parts_mut(&mut self.parts, "run command")?;
        if parts.sampler.cancel() {
            self.drag = None;
        }
        self.start(spec)?;
        Ok(Some(spec))
    }

    /// Hand the frame to the animator for `spec`.
    fn start(&mut self, spec: TransitionSpec) -> Result<()> {
        let parts = parts_mut(&mut self.parts, "start transition")?;
        if let Some(frame) = parts.animator.cancel() {
            self.frame = frame;
        }
        let target = self.mapper.target_frame(spec.from, spec.target);
        parts.animator.animate(self.frame, target, spec)?;
        // Idle time before a transition is not animation time.
        self.clock.reset();
        Ok(())
    }

    fn recover(&mut self, spec: TransitionSpec, last_good: VisualFrame) -> Result<()> {
        let state = if last_good.translate_y > last_good.height / 2.0 {
            SheetState::Closed
        } else {
            SheetState::Partial
        };
        warn!(
            target: "feedsheet.sheet",
            id = %spec.id,
            kind = spec.kind.name(),
            recovered = state.name(),
            "transition faulted; settling"
        );
        let parts = parts_mut(&mut self.parts, "recover")?;
        parts.animator.cancel();
        let change = parts.machine.settle(state)?;
        self.frame = self.mapper.target_frame(change.from, state);
        self.listeners.frame(&self.frame, FrameSource::Recovery);
        self.apply_change(change);
        Ok(())
    }

    fn apply_change(&mut self, change: StateChange) {
        self.last_state = change.to;
        if change.is_change() {
            for listener in &mut self.listeners.state {
                listener(change.to);
            }
            if change.from.is_full() != change.to.is_full() {
                for listener in &mut self.listeners.expand {
                    listener(change.to.is_full());
                }
            }
        }
        if change.to.is_closed() {
            self.dismiss();
        }
    }

    fn dismiss(&mut self) {
        if self.dismissed {
            return;
        }
        self.dismissed = true;
        self.parts = None;
        self.drag = None;
        debug!(target: "feedsheet.sheet", "sheet dismissed");
        for callback in &mut self.listeners.dismiss {
            callback();
        }
    }
}

fn parts_mut<'a>(parts: &'a mut Option<Parts>, operation: &'static str) -> Result<&'a mut Parts> {
    parts
        .as_mut()
        .ok_or(SheetError::invalid_state(operation, "the sheet is released"))
}

impl fmt::Debug for SheetHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetHost")
            .field("state", &self.state())
            .field("frame", &self.frame)
            .field("dragging", &self.is_dragging())
            .field("animating", &self.is_animating())
            .field("released", &self.is_released())
            .field("has_content", &self.content.is_some())
            .finish()
    }
}
