//! End-to-end sheet scenarios driven through the public facade.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use feedsheet::prelude::*;
use feedsheet::{Thresholds, TransitionKind};
use feedsheet_harness::{Command, FrameRecorder, GestureScript, Recorded, settle};
use tracing::Subscriber;
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const FRAME: Duration = Duration::from_millis(16);

fn sheet(initial: SheetState) -> SheetHost {
    SheetHost::new(
        SheetConfig::default()
            .geometry(feedsheet::SheetGeometry::new(500.0, 800.0))
            .initial_state(initial),
    )
    .unwrap()
}

#[test]
fn scenario_a_short_drag_snaps_back() {
    let mut h = sheet(SheetState::Partial);
    let rec = FrameRecorder::attach(&mut h);
    let specs = GestureScript::new(200.0).flick(60.0, 4).play(&mut h).unwrap();
    assert_eq!(specs[0].kind, TransitionKind::SnapBack);
    settle(&mut h, 200).unwrap();
    assert_eq!(h.state(), SheetState::Partial);
    assert_eq!(h.current_frame(), VisualFrame::at_rest(500.0, 24.0));
    assert!(rec.states().is_empty());
    assert_eq!(rec.dismiss_count(), 0);
}

#[test]
fn scenario_b_long_drag_dismisses_once() {
    let mut h = sheet(SheetState::Partial);
    let rec = FrameRecorder::attach(&mut h);
    let specs = GestureScript::new(200.0).flick(150.0, 5).play(&mut h).unwrap();
    assert_eq!(specs[0].target, SheetState::Closed);
    settle(&mut h, 200).unwrap();
    assert_eq!(rec.dismiss_count(), 1);
    assert_eq!(rec.states(), vec![SheetState::Closed]);
    assert_eq!(h.state(), SheetState::Closed);

    // Released: further input fails and nothing else is emitted.
    assert!(h.tick(FRAME).unwrap_err().is_invalid_state());
    assert!(h.request_close().unwrap_err().is_invalid_state());
    assert_eq!(rec.dismiss_count(), 1);
}

#[test]
fn scenario_c_drag_up_expands_to_square_corners() {
    let mut h = sheet(SheetState::Partial);
    let rec = FrameRecorder::attach(&mut h);
    GestureScript::new(400.0).flick(-70.0, 3).play(&mut h).unwrap();
    settle(&mut h, 200).unwrap();
    assert_eq!(h.state(), SheetState::Full);
    let frame = h.current_frame();
    assert_eq!(frame.corner_radius, 0.0);
    assert_eq!(frame.height, 800.0);
    assert!(rec.events().contains(&Recorded::Expand(true)));
}

#[test]
fn scenario_d_command_collapse_uses_animator() {
    let mut h = sheet(SheetState::Full);
    let rec = FrameRecorder::attach(&mut h);
    let spec = h.request_collapse().unwrap().unwrap();
    assert_eq!(spec.kind, TransitionKind::Collapse);
    settle(&mut h, 200).unwrap();
    assert_eq!(h.state(), SheetState::Partial);
    assert!(
        rec.frames()
            .iter()
            .all(|(_, source)| *source == FrameSource::Animator)
    );
    assert_eq!(rec.states(), vec![SheetState::Partial]);
    assert!(rec.events().contains(&Recorded::Expand(false)));
}

#[test]
fn scenario_e_touch_mid_collapse_has_no_jump() {
    let mut h = sheet(SheetState::Full);
    let rec = FrameRecorder::attach(&mut h);
    h.request_collapse().unwrap();
    for _ in 0..10 {
        h.tick(FRAME).unwrap();
    }
    let animated_step = rec.max_step();
    let handoff = h.current_frame();

    h.handle_touch_start(TouchEvent::new(300.0, 1000.0)).unwrap();
    assert!(!h.is_animating());
    assert_eq!(h.current_frame(), handoff);
    assert_eq!(h.state(), SheetState::Full, "interrupted collapse is not confirmed");

    // Five px per sample is slower than the collapse was moving.
    for i in 1..=4 {
        let i = f64::from(i);
        h.handle_touch_move(TouchEvent::new(300.0 + 5.0 * i, 1000.0 + 16.0 * i))
            .unwrap();
    }
    assert!(rec.max_step() <= animated_step + 1e-9);
    assert!((h.current_frame().translate_y - (handoff.translate_y + 20.0)).abs() < 1e-9);

    // A short drag from FULL snaps back to FULL.
    let spec = h.handle_touch_end(TouchEvent::new(320.0, 1080.0)).unwrap();
    assert_eq!(spec.target, SheetState::Full);
    settle(&mut h, 200).unwrap();
    assert_eq!(h.current_frame(), VisualFrame::at_rest(800.0, 0.0));
}

#[test]
fn drag_owns_the_frame_exclusively() {
    let mut h = sheet(SheetState::Partial);
    let rec = FrameRecorder::attach(&mut h);
    h.present().unwrap();
    h.tick(FRAME).unwrap();
    h.handle_touch_start(TouchEvent::new(100.0, 0.0)).unwrap();
    rec.clear();
    for i in 1..=5 {
        h.tick(FRAME).unwrap();
        h.handle_touch_move(TouchEvent::new(100.0 + f64::from(i), 16.0 * f64::from(i)))
            .unwrap();
    }
    assert!(
        rec.frames()
            .iter()
            .all(|(_, source)| *source == FrameSource::Gesture)
    );
}

#[test]
fn completion_follows_final_frame() {
    let mut h = sheet(SheetState::Partial);
    let rec = FrameRecorder::attach(&mut h);
    h.request_expand().unwrap();
    settle(&mut h, 200).unwrap();
    let events = rec.events();
    let state_at = events
        .iter()
        .position(|e| *e == Recorded::State(SheetState::Full))
        .unwrap();
    assert_eq!(
        events[state_at - 1],
        Recorded::Frame {
            frame: VisualFrame::at_rest(800.0, 0.0),
            source: FrameSource::Animator,
        }
    );
    assert!(
        events[state_at + 1..]
            .iter()
            .all(|e| !matches!(e, Recorded::Frame { .. }))
    );
}

#[test]
fn close_command_during_drag_wins() {
    let mut h = sheet(SheetState::Full);
    let rec = FrameRecorder::attach(&mut h);
    let report = GestureScript::new(100.0)
        .press()
        .drag_by(30.0, 3)
        .command(Command::Close)
        .release()
        .wait(30)
        .play_lenient(&mut h);
    // press, three moves, command, then the release finds no session.
    assert_eq!(report.rejected[0].0, 5);
    assert!(report.rejected.iter().all(|(_, err)| err.is_invalid_state()));
    assert_eq!(rec.dismiss_count(), 1);
    assert!(h.is_released());
}

#[test]
fn custom_thresholds_change_outcome() {
    let config = SheetConfig::default()
        .geometry(feedsheet::SheetGeometry::new(500.0, 800.0))
        .thresholds(Thresholds {
            close_ratio: 0.5,
            ..Thresholds::default()
        });
    let mut h = SheetHost::new(config).unwrap();
    let specs = GestureScript::new(0.0).flick(200.0, 4).play(&mut h).unwrap();
    assert_eq!(specs[0].target, SheetState::Partial);
}

#[test]
fn present_then_dispose_is_silent() {
    let mut h = sheet(SheetState::Partial);
    let rec = FrameRecorder::attach(&mut h);
    h.present().unwrap();
    h.tick(FRAME).unwrap();
    h.dispose();
    assert!(h.tick(FRAME).unwrap_err().is_invalid_state());
    assert_eq!(rec.dismiss_count(), 0);
}

#[derive(Default)]
struct SpanCapture {
    names: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for SpanCapture {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.names
            .lock()
            .expect("capture lock")
            .push(attrs.metadata().name().to_string());
    }
}

#[test]
fn each_transition_gets_a_span() {
    let capture = SpanCapture::default();
    let names = Arc::clone(&capture.names);
    let subscriber = tracing_subscriber::registry().with(capture);
    tracing::subscriber::with_default(subscriber, || {
        let mut h = sheet(SheetState::Partial);
        h.request_expand().unwrap();
        settle(&mut h, 200).unwrap();
        h.request_close().unwrap();
        settle(&mut h, 200).unwrap();
    });
    let names = names.lock().expect("capture lock");
    assert_eq!(
        names.iter().filter(|n| *n == "sheet.transition").count(),
        2
    );
}
