//! Seeded gesture storms against a live host.
//!
//! Whatever the input, every rendered frame stays finite and in range, the
//! dismiss callback fires at most once, and only lifecycle errors surface.

use feedsheet_harness::{FrameRecorder, gesture_storm, settle};
use feedsheet_widgets::{SheetConfig, SheetHost, SheetState};
use proptest::prelude::*;

fn host() -> SheetHost {
    SheetHost::new(SheetConfig::comments(800.0)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn storm_frames_stay_valid(seed in any::<u64>(), actions in 1usize..80) {
        let mut h = host();
        let rec = FrameRecorder::attach(&mut h);
        let report = gesture_storm(seed, actions).play_lenient(&mut h);

        prop_assert!(rec.first_invalid_frame().is_none());
        prop_assert!(rec.dismiss_count() <= 1);
        for (_, err) in &report.rejected {
            prop_assert!(err.is_invalid_state(), "unexpected error {err}");
        }
        if rec.dismiss_count() == 1 {
            prop_assert_eq!(h.state(), SheetState::Closed);
            prop_assert!(h.is_released());
        }
    }

    #[test]
    fn storm_is_deterministic(seed in any::<u64>()) {
        let run = |seed| {
            let mut h = host();
            let rec = FrameRecorder::attach(&mut h);
            gesture_storm(seed, 40).play_lenient(&mut h);
            rec.checksum()
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}

#[test]
fn storm_leaves_a_stable_state() {
    let mut h = host();
    let report = gesture_storm(0xfeed, 120).play_lenient(&mut h);
    assert_eq!(report.steps_run, gesture_storm(0xfeed, 120).len());
    if !h.is_released() {
        settle(&mut h, 200).unwrap();
        assert!(!h.is_animating());
        assert!(!h.is_dragging());
    }
}
