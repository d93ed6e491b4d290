#![forbid(unsafe_code)]

//! Interactive bottom sheet: drag-to-dismiss, drag-to-expand.
//!
//! # Pipeline
//!
//! ```text
//! touch ─▶ GestureSampler ─▶ ProgressMapper ─▶ VisualFrame (live)
//!              │ release
//!              ▼
//!        SheetStateMachine ─▶ TransitionSpec ─▶ TransitionAnimator ─▶ VisualFrame
//!              ▲                                        │ completion
//!              └────────────────────────────────────────┘
//! ```
//!
//! [`SheetHost`] wires the pieces together and owns them for the sheet's
//! lifetime.
//!
//! # Invariants
//!
//! - The observable state is always `Closed`, `Partial`, or `Full`; an
//!   in-flight transition is internal bookkeeping.
//! - At most one producer writes the visual frame at a time. A touch-down
//!   during a transition cancels the animator before the drag takes over.
//! - `Closed` is terminal; every later mutation fails with
//!   [`SheetError::InvalidState`](feedsheet_core::SheetError::InvalidState).

mod animator;
mod config;
mod host;
mod progress;
mod state;

pub use animator::{AnimatorEvent, Completion, TransitionAnimator, TransitionHandle};
pub use config::{
    ConfigError, CornerRadii, MAX_TIMEOUT_MS, MotionConfig, SheetConfig, SheetGeometry, Thresholds,
};
pub use host::{FrameSource, SheetContent, SheetHost};
pub use progress::{ProgressMapper, drag_progress};
pub use state::{
    SheetState, SheetStateMachine, StateChange, TransitionCurve, TransitionId, TransitionKind,
    TransitionSpec, next_state,
};
