#![forbid(unsafe_code)]

//! Test harness for feedsheet.
//!
//! - [`gesture_script`]: deterministic touch scripts and seeded gesture
//!   storms that drive a [`SheetHost`](feedsheet_widgets::SheetHost).
//! - [`frame_recorder`]: captures every frame and lifecycle callback a host
//!   emits, with continuity checks and a blake3 checksum of the JSONL log.

pub mod frame_recorder;
pub mod gesture_script;

pub use frame_recorder::{FrameRecorder, Recorded};
pub use gesture_script::{
    Command, FRAME_MS, GestureScript, PlaybackReport, ScriptStep, gesture_storm, settle,
};
