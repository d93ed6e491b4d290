//! Property-based invariants for the sheet mapper, state machine, and host.
//!
//! 1. **Ranges**: every mapped frame has `scale ∈ [0.8, 1]`,
//!    `corner_radius ∈ [0, 40]`, `opacity ∈ [0, 1]`, `translate_y ≥ 0`.
//! 2. **Monotonicity**: a larger downward delta never yields a larger scale
//!    or opacity.
//! 3. **Table**: a release always resolves to one of the table's outcomes
//!    and the machine only ever reports stable states.
//! 4. **Terminal**: once closed, every mutation fails with `InvalidState`.
//! 5. **Continuity**: touching down mid-transition never makes the frame
//!    jump.

use std::time::Duration;

use feedsheet_core::{GestureSummary, TouchEvent};
use feedsheet_widgets::sheet::{drag_progress, next_state};
use feedsheet_widgets::{
    CornerRadii, ProgressMapper, SheetConfig, SheetGeometry, SheetHost, SheetState,
    SheetStateMachine, Thresholds,
};
use proptest::prelude::*;

fn open_state() -> impl Strategy<Value = SheetState> {
    prop_oneof![Just(SheetState::Partial), Just(SheetState::Full)]
}

proptest! {
    #[test]
    fn mapped_frames_stay_in_range(
        delta in -2000.0f64..2000.0,
        modal in 1.0f64..2000.0,
        state in open_state(),
    ) {
        let geometry = SheetGeometry::new(modal, modal * 1.3);
        let mapper = ProgressMapper::new(geometry, CornerRadii::default());
        let f = mapper.map(delta, state);
        prop_assert!((0.8..=1.0).contains(&f.scale));
        prop_assert!((0.0..=40.0).contains(&f.corner_radius));
        prop_assert!((0.0..=1.0).contains(&f.opacity));
        prop_assert!(f.translate_y >= 0.0);
        prop_assert!((0.0..=1.0).contains(&drag_progress(delta, modal)));
    }

    #[test]
    fn deeper_drag_never_grows_the_sheet(
        a in 0.0f64..1500.0,
        b in 0.0f64..1500.0,
        state in open_state(),
    ) {
        let geometry = SheetGeometry::new(600.0, 800.0);
        let mapper = ProgressMapper::new(geometry, CornerRadii::default());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let near = mapper.map(lo, state);
        let far = mapper.map(hi, state);
        prop_assert!(far.scale <= near.scale);
        prop_assert!(far.opacity <= near.opacity);
        prop_assert!(far.corner_radius >= near.corner_radius);
    }

    #[test]
    fn release_follows_table(
        net in -1000.0f64..1000.0,
        state in open_state(),
        modal in 100.0f64..1200.0,
    ) {
        let config = SheetConfig::default()
            .geometry(SheetGeometry::new(modal, modal * 1.25))
            .initial_state(state);
        let mut machine = SheetStateMachine::new(&config);
        let summary = GestureSummary::new(net, 0.0);
        let spec = machine.release(&summary).unwrap();
        let t = Thresholds::default();
        prop_assert_eq!(Some(spec.target), next_state(state, &summary, &t, modal));
        if state == SheetState::Partial {
            let moved = net < -50.0 || net > modal * 0.2;
            prop_assert_eq!(spec.target == SheetState::Partial, !moved);
        } else {
            prop_assert_ne!(spec.target, SheetState::Closed);
        }
        prop_assert_eq!(machine.state(), state, "unconfirmed until complete");
        machine.complete(spec.id).unwrap();
        prop_assert_eq!(machine.state(), spec.target);
    }

    #[test]
    fn touch_mid_transition_is_continuous(
        frames in 1usize..30,
        drag in 0.0f64..50.0,
    ) {
        let config = SheetConfig::default()
            .geometry(SheetGeometry::new(500.0, 800.0))
            .initial_state(SheetState::Full);
        let mut host = SheetHost::new(config).unwrap();
        host.request_collapse().unwrap();
        for _ in 0..frames {
            host.tick(Duration::from_millis(16)).unwrap();
        }
        let before = host.current_frame();
        host.handle_touch_start(TouchEvent::new(300.0, 0.0)).unwrap();
        prop_assert_eq!(host.current_frame(), before);
        prop_assert!(!host.is_animating());
        host.handle_touch_move(TouchEvent::new(300.0 + drag, 16.0)).unwrap();
        let after = host.current_frame();
        prop_assert!(before.max_pixel_step(&after) <= drag * 1.5 + 1e-9);
        prop_assert_eq!(after.height, before.height);
        prop_assert_eq!(host.state(), SheetState::Full);
    }
}

#[test]
fn closed_machine_rejects_everything() {
    let mut machine = SheetStateMachine::new(&SheetConfig::default());
    let spec = machine.request_close().unwrap().unwrap();
    machine.complete(spec.id).unwrap();
    assert!(machine.request_expand().unwrap_err().is_invalid_state());
    assert!(machine.request_collapse().unwrap_err().is_invalid_state());
    assert!(machine.request_close().unwrap_err().is_invalid_state());
    assert!(
        machine
            .release(&GestureSummary::new(-100.0, 0.0))
            .unwrap_err()
            .is_invalid_state()
    );
}
