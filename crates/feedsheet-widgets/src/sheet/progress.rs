#![forbid(unsafe_code)]

//! Drag delta to visual frame.
//!
//! ```text
//! progress = clamp(delta_y / (modal_height × 0.5), 0, 1)
//! scale    = 1 - progress × 0.1
//! radius   = base + progress × (max - base)
//! opacity  = 1 - progress × 0.5
//! translate_y = max(0, delta_y)
//! ```
//!
//! The mapping is a pure function of its inputs: identical input gives a
//! bit-identical frame.

use feedsheet_core::VisualFrame;

use super::config::{CornerRadii, SheetGeometry};
use super::state::SheetState;

/// Scale lost at full drag progress.
const SCALE_RANGE: f64 = 0.1;
/// Opacity lost at full drag progress.
const OPACITY_RANGE: f64 = 0.5;

/// Normalized drag progress in `[0, 1]`. Reaches 1 at half the modal height.
///
/// A non-positive or non-finite `modal_height` yields 0.
#[must_use]
pub fn drag_progress(delta_y: f64, modal_height: f64) -> f64 {
    if !(modal_height.is_finite() && modal_height > 0.0) || !delta_y.is_finite() {
        return 0.0;
    }
    (delta_y / (modal_height * 0.5)).clamp(0.0, 1.0)
}

/// Maps drag deltas and states to frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressMapper {
    geometry: SheetGeometry,
    radii: CornerRadii,
}

impl ProgressMapper {
    #[must_use]
    pub fn new(geometry: SheetGeometry, radii: CornerRadii) -> Self {
        Self { geometry, radii }
    }

    #[must_use]
    pub fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }

    /// Frame for a live drag of `delta_y` from the rest position of `state`.
    #[must_use]
    pub fn map(&self, delta_y: f64, state: SheetState) -> VisualFrame {
        let progress = drag_progress(delta_y, self.geometry.modal_height);
        let base = self.radii.base_for(state);
        let translate_y = if delta_y.is_finite() {
            delta_y.max(0.0)
        } else {
            0.0
        };
        VisualFrame {
            translate_y,
            scale: 1.0 - progress * SCALE_RANGE,
            corner_radius: base + progress * (self.radii.max - base),
            opacity: 1.0 - progress * OPACITY_RANGE,
            height: self.geometry.height_for(state),
        }
        .clamped()
    }

    /// Resting frame for `state`.
    #[must_use]
    pub fn rest_frame(&self, state: SheetState) -> VisualFrame {
        VisualFrame::at_rest(
            self.geometry.height_for(state),
            self.radii.base_for(state),
        )
    }

    /// End frame of a close from `from`: slid below the screen and faded out.
    #[must_use]
    pub fn closed_frame(&self, from: SheetState) -> VisualFrame {
        let height = self.geometry.height_for(from);
        VisualFrame {
            translate_y: height,
            opacity: 0.0,
            ..self.rest_frame(from)
        }
    }

    /// Start frame of the mount transition into `state`: fully below the
    /// screen, opaque.
    #[must_use]
    pub fn hidden_frame(&self, state: SheetState) -> VisualFrame {
        let height = self.geometry.height_for(state);
        VisualFrame {
            translate_y: height,
            ..self.rest_frame(state)
        }
    }

    /// Target frame for a transition into `target` that started in `from`.
    #[must_use]
    pub fn target_frame(&self, from: SheetState, target: SheetState) -> VisualFrame {
        match target {
            SheetState::Closed => self.closed_frame(from),
            state => self.rest_frame(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> ProgressMapper {
        ProgressMapper::new(SheetGeometry::new(600.0, 800.0), CornerRadii::default())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_delta_is_rest_frame() {
        let m = mapper();
        assert_eq!(m.map(0.0, SheetState::Partial), m.rest_frame(SheetState::Partial));
        assert_eq!(m.map(0.0, SheetState::Full), m.rest_frame(SheetState::Full));
    }

    #[test]
    fn partial_quarter_progress() {
        // 75px over a 600px modal: progress 0.25.
        let f = mapper().map(75.0, SheetState::Partial);
        assert!(close(f.translate_y, 75.0));
        assert!(close(f.scale, 0.975));
        assert!(close(f.corner_radius, 28.0));
        assert!(close(f.opacity, 0.875));
        assert!(close(f.height, 600.0));
    }

    #[test]
    fn full_progress_saturates() {
        let f = mapper().map(450.0, SheetState::Partial);
        assert!(close(f.scale, 0.9));
        assert!(close(f.corner_radius, 40.0));
        assert!(close(f.opacity, 0.5));
        assert!(close(f.translate_y, 450.0));
    }

    #[test]
    fn full_state_radius_starts_square() {
        let f = mapper().map(150.0, SheetState::Full);
        assert!(close(f.corner_radius, 20.0));
        assert!(close(f.height, 800.0));
    }

    #[test]
    fn upward_delta_stays_at_rest() {
        let m = mapper();
        assert_eq!(m.map(-200.0, SheetState::Partial), m.rest_frame(SheetState::Partial));
    }

    #[test]
    fn degenerate_modal_height() {
        assert_eq!(drag_progress(100.0, 0.0), 0.0);
        assert_eq!(drag_progress(100.0, -5.0), 0.0);
        assert_eq!(drag_progress(100.0, f64::NAN), 0.0);
        assert_eq!(drag_progress(f64::INFINITY, 600.0), 0.0);
        let m = ProgressMapper::new(SheetGeometry::new(0.0, 0.0), CornerRadii::default());
        let f = m.map(50.0, SheetState::Partial);
        assert!(f.is_finite());
        assert_eq!(f.scale, 1.0);
    }

    #[test]
    fn deterministic() {
        let m = mapper();
        for delta in [0.0, 0.1, 13.37, 299.999, 1e6] {
            let a = m.map(delta, SheetState::Partial);
            let b = m.map(delta, SheetState::Partial);
            assert_eq!(a.translate_y.to_bits(), b.translate_y.to_bits());
            assert_eq!(a.scale.to_bits(), b.scale.to_bits());
            assert_eq!(a.corner_radius.to_bits(), b.corner_radius.to_bits());
            assert_eq!(a.opacity.to_bits(), b.opacity.to_bits());
        }
    }

    #[test]
    fn transition_targets() {
        let m = mapper();
        let closed = m.target_frame(SheetState::Full, SheetState::Closed);
        assert_eq!(closed.translate_y, 800.0);
        assert_eq!(closed.opacity, 0.0);
        assert_eq!(
            m.target_frame(SheetState::Partial, SheetState::Full),
            VisualFrame::at_rest(800.0, 0.0)
        );
        let hidden = m.hidden_frame(SheetState::Partial);
        assert_eq!(hidden.translate_y, 600.0);
        assert_eq!(hidden.opacity, 1.0);
    }
}
