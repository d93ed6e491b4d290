//! Property-based lifecycle invariants through the public facade.
//!
//! 1. **Dismiss once**: whatever mix of commands and frames, `on_dismiss`
//!    fires at most once, and only when the sheet reached `Closed`.
//! 2. **Stable state**: `state()` only ever reports a confirmed state, and a
//!    settled sheet rests exactly on that state's rest frame.
//! 3. **Released means rejected**: after closing, every command fails with
//!    `InvalidState`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use feedsheet::prelude::*;
use feedsheet::{ProgressMapper, SheetGeometry};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    Expand,
    Collapse,
    Close,
    Frames(u8),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => Just(Action::Expand),
        2 => Just(Action::Collapse),
        1 => Just(Action::Close),
        4 => (1u8..40).prop_map(Action::Frames),
    ]
}

fn initial() -> impl Strategy<Value = SheetState> {
    prop_oneof![Just(SheetState::Partial), Just(SheetState::Full)]
}

proptest! {
    #[test]
    fn commands_and_frames_keep_lifecycle_consistent(
        start in initial(),
        actions in prop::collection::vec(action(), 0..30),
    ) {
        let geometry = SheetGeometry::new(600.0, 800.0);
        let config = SheetConfig::default().geometry(geometry).initial_state(start);
        let mut sheet = SheetHost::new(config).unwrap();
        let dismissed = Rc::new(RefCell::new(0u32));
        let count = Rc::clone(&dismissed);
        sheet.on_dismiss(move || *count.borrow_mut() += 1);

        for action in actions {
            let result = match action {
                Action::Expand => sheet.request_expand().map(|_| ()),
                Action::Collapse => sheet.request_collapse().map(|_| ()),
                Action::Close => sheet.request_close().map(|_| ()),
                Action::Frames(n) => (0..n).try_for_each(|_| sheet.tick(Duration::from_millis(16))),
            };
            if let Err(err) = result {
                prop_assert!(err.is_invalid_state());
                prop_assert!(sheet.is_released());
            }
            prop_assert!(*dismissed.borrow() <= 1);
        }

        if sheet.is_released() {
            prop_assert_eq!(*dismissed.borrow(), 1);
            prop_assert_eq!(sheet.state(), SheetState::Closed);
            prop_assert!(sheet.request_expand().unwrap_err().is_invalid_state());
            prop_assert!(sheet.request_close().unwrap_err().is_invalid_state());
        } else {
            prop_assert_eq!(*dismissed.borrow(), 0);
            for _ in 0..200 {
                if !sheet.is_animating() {
                    break;
                }
                sheet.tick(Duration::from_millis(16)).unwrap();
            }
            if !sheet.is_released() {
                let mapper = ProgressMapper::new(geometry, SheetConfig::default().radii);
                prop_assert_eq!(sheet.current_frame(), mapper.rest_frame(sheet.state()));
            }
        }
    }
}
