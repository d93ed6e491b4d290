#![forbid(unsafe_code)]

//! Discrete sheet states and the transition table between them.
//!
//! State machine:
//!
//! | Current | Condition on release | Next |
//! |---------|----------------------|------|
//! | Partial | `net < -expand_threshold_px` | Full |
//! | Partial | `net > modal_height × close_ratio` | Closed |
//! | Partial | otherwise | Partial (snap back) |
//! | Full | `net > collapse_threshold_px` | Partial |
//! | Full | otherwise | Full (snap back) |
//! | Closed | terminal | none |
//!
//! Every release and command produces a [`TransitionSpec`]; the state is only
//! confirmed when the animator reports completion through
//! [`SheetStateMachine::complete`]. Until then [`SheetStateMachine::state`]
//! keeps returning the last confirmed state.

use std::fmt;
use std::time::Duration;

use feedsheet_core::animation::{Easing, SpringParams};
use feedsheet_core::{GestureSummary, Result, SheetError};
use tracing::debug;

use super::config::{MotionConfig, SheetConfig, Thresholds};

/// Externally observable sheet state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum SheetState {
    /// Dismissed. Terminal.
    Closed,
    /// Presented at the modal height.
    #[default]
    Partial,
    /// Expanded to the full height.
    Full,
}

impl SheetState {
    /// Lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }

    #[inline]
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies one transition from creation to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

impl TransitionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Why a transition was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Mount animation into the initial state.
    Open,
    /// Partial to full.
    Expand,
    /// Full to partial.
    Collapse,
    /// Slide off screen and fade out.
    Close,
    /// Return to the current state's rest frame.
    SnapBack,
}

impl TransitionKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Expand => "expand",
            Self::Collapse => "collapse",
            Self::Close => "close",
            Self::SnapBack => "snap_back",
        }
    }

    fn between(from: SheetState, to: SheetState) -> Self {
        match (from, to) {
            (_, SheetState::Closed) => Self::Close,
            (SheetState::Partial, SheetState::Full) => Self::Expand,
            (SheetState::Full, SheetState::Partial) => Self::Collapse,
            _ => Self::SnapBack,
        }
    }
}

/// Interpolation curve for a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionCurve {
    /// Fixed duration with an easing curve.
    Timing { duration: Duration, easing: Easing },
    /// Damped spring; settles when every channel is near its target.
    Spring(SpringParams),
}

/// Declarative description of one transition.
///
/// Created by [`SheetStateMachine`], consumed once by the animator. The
/// animator's completion event carries `id` back to
/// [`SheetStateMachine::complete`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub id: TransitionId,
    pub kind: TransitionKind,
    /// Confirmed state when the transition started.
    pub from: SheetState,
    pub target: SheetState,
    pub curve: TransitionCurve,
}

/// A confirmed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: SheetState,
    pub to: SheetState,
}

impl StateChange {
    /// Whether the state actually changed (snap-backs do not).
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stable(SheetState),
    Transitioning {
        from: SheetState,
        to: SheetState,
        id: TransitionId,
    },
}

/// Resolve a finished drag into the next state.
///
/// Returns `None` for [`SheetState::Closed`], which accepts no transitions.
#[must_use]
pub fn next_state(
    current: SheetState,
    summary: &GestureSummary,
    thresholds: &Thresholds,
    modal_height: f64,
) -> Option<SheetState> {
    let net = summary.net_delta_y;
    match current {
        SheetState::Closed => None,
        SheetState::Partial => Some(if net < -thresholds.expand_threshold_px {
            SheetState::Full
        } else if net > modal_height * thresholds.close_ratio {
            SheetState::Closed
        } else {
            SheetState::Partial
        }),
        SheetState::Full => Some(if net > thresholds.collapse_threshold_px {
            SheetState::Partial
        } else {
            SheetState::Full
        }),
    }
}

/// Owns the discrete sheet state.
#[derive(Debug, Clone)]
pub struct SheetStateMachine {
    phase: Phase,
    thresholds: Thresholds,
    modal_height: f64,
    motion: MotionConfig,
    next_id: u64,
}

impl SheetStateMachine {
    /// Create a machine in the configured initial state.
    #[must_use]
    pub fn new(config: &SheetConfig) -> Self {
        Self {
            phase: Phase::Stable(config.initial_state),
            thresholds: config.thresholds,
            modal_height: config.geometry.modal_height,
            motion: config.motion,
            next_id: 1,
        }
    }

    /// Last confirmed state. Never reports an in-flight transition.
    #[must_use]
    pub fn state(&self) -> SheetState {
        match self.phase {
            Phase::Stable(state) => state,
            Phase::Transitioning { from, .. } => from,
        }
    }

    /// Target of the in-flight transition, if any.
    #[must_use]
    pub fn pending_target(&self) -> Option<SheetState> {
        match self.phase {
            Phase::Stable(_) => None,
            Phase::Transitioning { to, .. } => Some(to),
        }
    }

    /// Where the sheet is headed: the pending target, else the confirmed state.
    #[must_use]
    pub fn destination(&self) -> SheetState {
        self.pending_target().unwrap_or_else(|| self.state())
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    /// Whether the sheet has been confirmed closed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Stable(SheetState::Closed)
    }

    #[must_use]
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The state a release with `summary` would lead to, without side effects.
    pub fn resolve(&self, summary: &GestureSummary) -> Result<SheetState> {
        self.ensure_open("resolve gesture")?;
        next_state(self.state(), summary, &self.thresholds, self.modal_height)
            .ok_or(SheetError::invalid_state("resolve gesture", "the sheet is closed"))
    }

    /// Turn a finished drag into a transition. Supersedes any in-flight
    /// transition.
    pub fn release(&mut self, summary: &GestureSummary) -> Result<TransitionSpec> {
        let target = self.resolve(summary)?;
        self.interrupt();
        let kind = TransitionKind::between(self.state(), target);
        Ok(self.start(kind, target))
    }

    /// Expand to full. No-op unless the sheet is headed for `Partial`.
    pub fn request_expand(&mut self) -> Result<Option<TransitionSpec>> {
        self.ensure_open("expand")?;
        if self.destination() != SheetState::Partial {
            return Ok(None);
        }
        self.interrupt();
        Ok(Some(self.start(TransitionKind::Expand, SheetState::Full)))
    }

    /// Collapse to partial. No-op unless the sheet is headed for `Full`.
    pub fn request_collapse(&mut self) -> Result<Option<TransitionSpec>> {
        self.ensure_open("collapse")?;
        if self.destination() != SheetState::Full {
            return Ok(None);
        }
        self.interrupt();
        Ok(Some(self.start(TransitionKind::Collapse, SheetState::Partial)))
    }

    /// Close the sheet. No-op if a close is already in flight.
    pub fn request_close(&mut self) -> Result<Option<TransitionSpec>> {
        self.ensure_open("close")?;
        if self.destination() == SheetState::Closed {
            return Ok(None);
        }
        self.interrupt();
        Ok(Some(self.start(TransitionKind::Close, SheetState::Closed)))
    }

    /// Mount transition into the current state.
    pub fn open(&mut self) -> Result<TransitionSpec> {
        self.ensure_open("open")?;
        if self.is_transitioning() {
            return Err(SheetError::invalid_state(
                "open",
                "a transition is already in flight",
            ));
        }
        Ok(self.start(TransitionKind::Open, self.state()))
    }

    /// Abandon the in-flight transition, keeping the confirmed state.
    pub fn interrupt(&mut self) -> Option<TransitionId> {
        let Phase::Transitioning { from, to, id } = self.phase else {
            return None;
        };
        debug!(
            target: "feedsheet.sheet",
            %id,
            from = from.name(),
            to = to.name(),
            "transition interrupted"
        );
        self.phase = Phase::Stable(from);
        Some(id)
    }

    /// Confirm the transition `id`. Stale ids are ignored.
    pub fn complete(&mut self, id: TransitionId) -> Result<Option<StateChange>> {
        self.ensure_open("complete transition")?;
        match self.phase {
            Phase::Transitioning { from, to, id: current } if current == id => {
                self.phase = Phase::Stable(to);
                debug!(
                    target: "feedsheet.sheet",
                    %id,
                    from = from.name(),
                    to = to.name(),
                    "transition confirmed"
                );
                Ok(Some(StateChange { from, to }))
            }
            _ => Ok(None),
        }
    }

    /// Force a stable state, dropping any in-flight transition. Used to
    /// recover from animator faults.
    pub fn settle(&mut self, state: SheetState) -> Result<StateChange> {
        self.ensure_open("settle")?;
        let from = self.state();
        self.phase = Phase::Stable(state);
        Ok(StateChange { from, to: state })
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        if self.is_terminal() {
            return Err(SheetError::invalid_state(operation, "the sheet is closed"));
        }
        Ok(())
    }

    fn start(&mut self, kind: TransitionKind, target: SheetState) -> TransitionSpec {
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        let from = self.state();
        self.phase = Phase::Transitioning {
            from,
            to: target,
            id,
        };
        let curve = self.curve_for(kind);
        debug!(
            target: "feedsheet.sheet",
            %id,
            kind = kind.name(),
            from = from.name(),
            to = target.name(),
            "transition requested"
        );
        TransitionSpec {
            id,
            kind,
            from,
            target,
            curve,
        }
    }

    fn curve_for(&self, kind: TransitionKind) -> TransitionCurve {
        match kind {
            TransitionKind::Open => TransitionCurve::Timing {
                duration: self.motion.open_duration(),
                easing: self.motion.open_easing,
            },
            TransitionKind::Close => TransitionCurve::Timing {
                duration: self.motion.close_duration(),
                easing: self.motion.close_easing,
            },
            TransitionKind::Expand | TransitionKind::Collapse | TransitionKind::SnapBack => {
                TransitionCurve::Spring(self.motion.spring)
            }
        }
    }
}
