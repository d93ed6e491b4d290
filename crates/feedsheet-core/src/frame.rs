#![forbid(unsafe_code)]

//! Visual frame: the derived values the renderer applies to the sheet surface.
//!
//! A [`VisualFrame`] is recomputed every frame and never persisted. Exactly one
//! producer (the live gesture path or the transition animator) writes it at a
//! time; ownership moves only when a gesture ends or an animation is cancelled.
//!
//! # Invariants
//!
//! 1. After [`VisualFrame::clamped`]: `scale ∈ [0.8, 1]`,
//!    `corner_radius ∈ [0, 40]`, `opacity ∈ [0, 1]`, `translate_y ≥ 0`,
//!    `height ≥ 0`.
//! 2. `a + (b - a) == b` up to floating point rounding.
//!
//! # Failure Modes
//!
//! - Non-finite channels are not clamped away; check [`VisualFrame::is_finite`]
//!   before handing a computed frame to the renderer.

use std::ops::{Add, Sub};

/// Lowest scale a sheet may be drawn at.
pub const MIN_SCALE: f64 = 0.8;
/// Largest corner radius a sheet may be drawn with.
pub const MAX_CORNER_RADIUS: f64 = 40.0;

/// Position, scale, rounding, fade, and height of the sheet for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisualFrame {
    /// Downward offset from the sheet's resting position, in px.
    pub translate_y: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Top corner radius, in px.
    pub corner_radius: f64,
    /// Surface opacity.
    pub opacity: f64,
    /// On-screen sheet height, in px.
    pub height: f64,
}

impl VisualFrame {
    /// Create a frame from raw channel values (not clamped).
    #[must_use]
    pub const fn new(
        translate_y: f64,
        scale: f64,
        corner_radius: f64,
        opacity: f64,
        height: f64,
    ) -> Self {
        Self {
            translate_y,
            scale,
            corner_radius,
            opacity,
            height,
        }
    }

    /// A fully presented frame of the given height and corner radius.
    #[must_use]
    pub const fn at_rest(height: f64, corner_radius: f64) -> Self {
        Self::new(0.0, 1.0, corner_radius, 1.0, height)
    }

    /// Clamp every channel into its valid range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            translate_y: self.translate_y.max(0.0),
            scale: self.scale.clamp(MIN_SCALE, 1.0),
            corner_radius: self.corner_radius.clamp(0.0, MAX_CORNER_RADIUS),
            opacity: self.opacity.clamp(0.0, 1.0),
            height: self.height.max(0.0),
        }
    }

    /// Whether every channel is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translate_y.is_finite()
            && self.scale.is_finite()
            && self.corner_radius.is_finite()
            && self.opacity.is_finite()
            && self.height.is_finite()
    }

    /// Linear interpolation toward `target`. `t` is not clamped so spring
    /// overshoot is preserved.
    #[must_use]
    pub fn lerp(&self, target: &Self, t: f64) -> Self {
        *self + (*target - *self) * t
    }

    /// Whether every channel of `self` is within `tolerance` of `other`.
    #[must_use]
    pub fn is_near(&self, other: &Self, tolerance: &FrameTolerance) -> bool {
        let d = *other - *self;
        d.translate_y.abs() <= tolerance.position_px
            && d.height.abs() <= tolerance.position_px
            && d.corner_radius.abs() <= tolerance.position_px
            && d.scale.abs() <= tolerance.unit
            && d.opacity.abs() <= tolerance.unit
    }

    /// Largest pixel-valued change between two frames (translate, height,
    /// or corner radius). Used to check continuity across frame sequences.
    #[must_use]
    pub fn max_pixel_step(&self, other: &Self) -> f64 {
        let d = *other - *self;
        d.translate_y
            .abs()
            .max(d.height.abs())
            .max(d.corner_radius.abs())
    }
}

/// Channel-wise difference between two frames.
///
/// Unlike [`VisualFrame`], a delta has no range invariants.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameDelta {
    pub translate_y: f64,
    pub scale: f64,
    pub corner_radius: f64,
    pub opacity: f64,
    pub height: f64,
}

impl FrameDelta {
    /// The zero delta.
    pub const ZERO: Self = Self {
        translate_y: 0.0,
        scale: 0.0,
        corner_radius: 0.0,
        opacity: 0.0,
        height: 0.0,
    };

    /// Whether every channel is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Sub for VisualFrame {
    type Output = FrameDelta;

    fn sub(self, rhs: Self) -> FrameDelta {
        FrameDelta {
            translate_y: self.translate_y - rhs.translate_y,
            scale: self.scale - rhs.scale,
            corner_radius: self.corner_radius - rhs.corner_radius,
            opacity: self.opacity - rhs.opacity,
            height: self.height - rhs.height,
        }
    }
}

impl Add<FrameDelta> for VisualFrame {
    type Output = VisualFrame;

    fn add(self, rhs: FrameDelta) -> VisualFrame {
        VisualFrame {
            translate_y: self.translate_y + rhs.translate_y,
            scale: self.scale + rhs.scale,
            corner_radius: self.corner_radius + rhs.corner_radius,
            opacity: self.opacity + rhs.opacity,
            height: self.height + rhs.height,
        }
    }
}

impl std::ops::Mul<f64> for FrameDelta {
    type Output = FrameDelta;

    fn mul(self, k: f64) -> FrameDelta {
        FrameDelta {
            translate_y: self.translate_y * k,
            scale: self.scale * k,
            corner_radius: self.corner_radius * k,
            opacity: self.opacity * k,
            height: self.height * k,
        }
    }
}

/// Per-channel closeness used to decide that a transition reached its target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameTolerance {
    /// Tolerance for pixel channels (translate, height, corner radius).
    pub position_px: f64,
    /// Tolerance for unit channels (scale, opacity).
    pub unit: f64,
}

impl Default for FrameTolerance {
    fn default() -> Self {
        Self {
            position_px: 0.5,
            unit: 0.001,
        }
    }
}
