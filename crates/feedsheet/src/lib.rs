#![forbid(unsafe_code)]

//! feedsheet public facade crate.
//!
//! Re-exports the stable surface of the sheet controller and offers a
//! prelude for hosts:
//!
//! ```rust,ignore
//! use feedsheet::prelude::*;
//!
//! let mut sheet = SheetHost::new(SheetConfig::comments(screen_height))?;
//! sheet.on_dismiss(|| close_overlay());
//! sheet.handle_touch_start(TouchEvent::new(y, t))?;
//! // ... once per display frame:
//! sheet.advance_to(Instant::now())?;
//! render(sheet.current_frame());
//! ```

// --- Core re-exports -------------------------------------------------------

pub use feedsheet_core::animation::{Easing, SpringParams};
pub use feedsheet_core::{
    DragSample, FrameTolerance, GestureSampler, GestureSummary, MalformedSample, SheetError,
    TouchEvent, VisualFrame,
};

// --- Sheet re-exports ------------------------------------------------------

pub use feedsheet_widgets::sheet::ConfigError;
pub use feedsheet_widgets::{
    AnimatorEvent, Completion, CornerRadii, FrameSource, MotionConfig, ProgressMapper,
    SheetConfig, SheetContent, SheetGeometry, SheetHost, SheetState, SheetStateMachine,
    StateChange, Thresholds, TransitionAnimator, TransitionCurve, TransitionHandle, TransitionId,
    TransitionKind, TransitionSpec,
};

/// Clock type accepted by [`SheetHost::advance_to`].
pub use web_time::Instant;

/// Standard result type for feedsheet APIs.
pub type Result<T> = std::result::Result<T, SheetError>;

/// Everything a host needs to wire up a sheet.
pub mod prelude {
    pub use crate::{
        FrameSource, Instant, Result, SheetConfig, SheetContent, SheetError, SheetHost,
        SheetState, TouchEvent, VisualFrame,
    };

    pub use crate::{core, widgets};
}

pub use feedsheet_core as core;
pub use feedsheet_widgets as widgets;
