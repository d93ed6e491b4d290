#![forbid(unsafe_code)]

//! Widgets: the interactive bottom sheet.
//!
//! The [`sheet`] module composes the gesture sampler from `feedsheet-core`
//! with a discrete state machine, a frame-driven transition animator, and a
//! host that exposes touch handlers, lifecycle callbacks, and content slots.

pub mod sheet;

pub use sheet::{
    AnimatorEvent, Completion, CornerRadii, FrameSource, MotionConfig, ProgressMapper,
    SheetConfig, SheetContent, SheetGeometry, SheetHost, SheetState, SheetStateMachine,
    StateChange, Thresholds, TransitionAnimator, TransitionCurve, TransitionHandle, TransitionId,
    TransitionKind, TransitionSpec,
};
