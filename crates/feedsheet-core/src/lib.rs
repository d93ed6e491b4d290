#![forbid(unsafe_code)]

//! Core: touch sampling, visual frames, and animation primitives.
//!
//! # Role in feedsheet
//! `feedsheet-core` is the input and motion layer. It turns raw touch samples
//! into drag data, defines the [`VisualFrame`](frame::VisualFrame) value the
//! renderer consumes, and provides the curves (springs, eased tweens) that
//! transitions are built from.
//!
//! # Primary responsibilities
//! - **GestureSampler**: one drag session at a time, delta and velocity per
//!   sample, malformed samples dropped without aborting the session.
//! - **VisualFrame**: translate, scale, corner radius, opacity, and height of
//!   the sheet surface, with range clamping and interpolation.
//! - **Animation**: the [`Animation`](animation::Animation) trait, easing,
//!   damped springs, and a frame clock.
//!
//! # How it fits in the system
//! `feedsheet-widgets` owns the sheet state machine, animator, and host. It
//! consumes the sampler's [`GestureSummary`](gesture::GestureSummary) and
//! drives the curves defined here once per display frame.

pub mod animation;
pub mod error;
pub mod frame;
pub mod gesture;

pub use error::{MalformedSample, Result, SheetError};
pub use frame::{FrameDelta, FrameTolerance, VisualFrame};
pub use gesture::{DragSample, DragSession, GestureSampler, GestureSummary, TouchEvent};
