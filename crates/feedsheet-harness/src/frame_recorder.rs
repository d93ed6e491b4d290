#![forbid(unsafe_code)]

//! Records everything a [`SheetHost`] emits, in order.
//!
//! Attach a [`FrameRecorder`] before driving the host; it registers itself as
//! a frame, state, expand, and dismiss listener and appends every callback to
//! a shared log.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"frame","idx":0,"source":"gesture","translate_y":12.0,"scale":0.996,"corner_radius":24.64,"opacity":0.98,"height":500.0}
//! {"event":"state","idx":9,"state":"full"}
//! {"event":"expand","idx":10,"expanded":true}
//! {"event":"dismiss","idx":31}
//! ```
//!
//! [`FrameRecorder::checksum`] hashes the JSONL with blake3, giving a stable
//! fingerprint for determinism checks.

use std::cell::RefCell;
use std::rc::Rc;

use feedsheet_core::VisualFrame;
use feedsheet_widgets::{FrameSource, SheetHost, SheetState};
use serde_json::json;

/// One recorded callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recorded {
    Frame {
        frame: VisualFrame,
        source: FrameSource,
    },
    State(SheetState),
    Expand(bool),
    Dismiss,
}

/// Shared log of host callbacks.
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    log: Rc<RefCell<Vec<Recorded>>>,
}

impl FrameRecorder {
    /// Register on `host` and start recording.
    pub fn attach(host: &mut SheetHost) -> Self {
        let recorder = Self::default();
        let log = Rc::clone(&recorder.log);
        host.on_frame(move |frame, source| {
            log.borrow_mut().push(Recorded::Frame {
                frame: *frame,
                source,
            });
        });
        let log = Rc::clone(&recorder.log);
        host.on_state_change(move |state| log.borrow_mut().push(Recorded::State(state)));
        let log = Rc::clone(&recorder.log);
        host.on_expand_changed(move |full| log.borrow_mut().push(Recorded::Expand(full)));
        let log = Rc::clone(&recorder.log);
        host.on_dismiss(move || log.borrow_mut().push(Recorded::Dismiss));
        recorder
    }

    /// Snapshot of every recorded callback.
    #[must_use]
    pub fn events(&self) -> Vec<Recorded> {
        self.log.borrow().clone()
    }

    /// Recorded frames in order.
    #[must_use]
    pub fn frames(&self) -> Vec<(VisualFrame, FrameSource)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Recorded::Frame { frame, source } => Some((*frame, *source)),
                _ => None,
            })
            .collect()
    }

    /// Confirmed state changes in order.
    #[must_use]
    pub fn states(&self) -> Vec<SheetState> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Recorded::State(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn dismiss_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|e| matches!(e, Recorded::Dismiss))
            .count()
    }

    /// Largest pixel change between consecutive recorded frames.
    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.frames()
            .windows(2)
            .map(|w| w[0].0.max_pixel_step(&w[1].0))
            .fold(0.0, f64::max)
    }

    /// Index and frame of the first frame with a non-finite or out-of-range
    /// channel.
    #[must_use]
    pub fn first_invalid_frame(&self) -> Option<(usize, VisualFrame)> {
        self.frames()
            .into_iter()
            .enumerate()
            .find(|(_, (frame, _))| !frame.is_finite() || frame.clamped() != *frame)
            .map(|(i, (frame, _))| (i, frame))
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// The log as JSON lines.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for (idx, event) in self.log.borrow().iter().enumerate() {
            let line = match event {
                Recorded::Frame { frame, source } => json!({
                    "event": "frame",
                    "idx": idx,
                    "source": source_name(*source),
                    "translate_y": frame.translate_y,
                    "scale": frame.scale,
                    "corner_radius": frame.corner_radius,
                    "opacity": frame.opacity,
                    "height": frame.height,
                }),
                Recorded::State(state) => json!({
                    "event": "state",
                    "idx": idx,
                    "state": state.name(),
                }),
                Recorded::Expand(expanded) => json!({
                    "event": "expand",
                    "idx": idx,
                    "expanded": expanded,
                }),
                Recorded::Dismiss => json!({"event": "dismiss", "idx": idx}),
            };
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }

    /// `blake3:<hex>` digest of [`to_jsonl`](Self::to_jsonl).
    #[must_use]
    pub fn checksum(&self) -> String {
        let hash = blake3::hash(self.to_jsonl().as_bytes());
        format!("blake3:{}", hash.to_hex())
    }
}

fn source_name(source: FrameSource) -> &'static str {
    match source {
        FrameSource::Gesture => "gesture",
        FrameSource::Animator => "animator",
        FrameSource::Recovery => "recovery",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture_script::{GestureScript, settle};
    use feedsheet_widgets::{SheetConfig, SheetGeometry};

    fn host() -> SheetHost {
        SheetHost::new(SheetConfig::default().geometry(SheetGeometry::new(500.0, 800.0))).unwrap()
    }

    #[test]
    fn records_drag_and_snap_back() {
        let mut h = host();
        let rec = FrameRecorder::attach(&mut h);
        GestureScript::new(100.0).flick(40.0, 4).play(&mut h).unwrap();
        settle(&mut h, 200).unwrap();
        let frames = rec.frames();
        assert_eq!(frames.iter().filter(|(_, s)| *s == FrameSource::Gesture).count(), 4);
        assert_eq!(frames.last().map(|(f, _)| *f), Some(VisualFrame::at_rest(500.0, 24.0)));
        assert!(rec.states().is_empty(), "snap-back is not a state change");
        assert!(rec.first_invalid_frame().is_none());
    }

    #[test]
    fn jsonl_lines_parse() {
        let mut h = host();
        let rec = FrameRecorder::attach(&mut h);
        GestureScript::new(100.0).flick(200.0, 4).play(&mut h).unwrap();
        settle(&mut h, 200).unwrap();
        let jsonl = rec.to_jsonl();
        let last: serde_json::Value =
            serde_json::from_str(jsonl.lines().last().unwrap()).unwrap();
        assert_eq!(last["event"], "dismiss");
        assert_eq!(rec.dismiss_count(), 1);
        assert!(rec.checksum().starts_with("blake3:"));
    }

    #[test]
    fn clear_empties_log() {
        let mut h = host();
        let rec = FrameRecorder::attach(&mut h);
        GestureScript::new(0.0).press().drag_by(10.0, 1).play(&mut h).unwrap();
        assert!(!rec.events().is_empty());
        rec.clear();
        assert!(rec.events().is_empty());
        assert_eq!(rec.max_step(), 0.0);
    }
}
