#![forbid(unsafe_code)]

//! Sheet configuration: geometry, release thresholds, corner radii, motion.
//!
//! Every tunable lives in [`SheetConfig`]. Defaults reproduce the comments
//! overlay: 50px expand/collapse thresholds, a 0.2 close ratio, 24px rounded
//! corners when partial, a 200ms close, and critically damped springs.
//!
//! # Loading
//!
//! With the `config` feature enabled:
//!
//! ```toml
//! initial_state = "partial"
//! touch_slop_px = 20.0
//!
//! [geometry]
//! modal_height = 600.0
//! full_height = 800.0
//!
//! [thresholds]
//! close_ratio = 0.25
//! ```
//!
//! ```rust,ignore
//! let config = SheetConfig::from_toml_str(text)?;
//! ```
//!
//! Missing fields take their defaults. Loaded configs are validated.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

use feedsheet_core::animation::{Easing, SpringParams};
use feedsheet_core::frame::MAX_CORNER_RADIUS;
use feedsheet_core::{FrameTolerance, SheetError};

use super::state::SheetState;

/// Hard ceiling on any transition, in ms.
pub const MAX_TIMEOUT_MS: u64 = 1000;

/// Fraction of the screen the partial sheet covers.
pub const PARTIAL_SCREEN_RATIO: f64 = 0.75;

/// Sheet heights in px.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetGeometry {
    /// Height when partial. Also the reference length for drag progress.
    pub modal_height: f64,
    /// Height when full.
    pub full_height: f64,
}

impl SheetGeometry {
    #[must_use]
    pub const fn new(modal_height: f64, full_height: f64) -> Self {
        Self {
            modal_height,
            full_height,
        }
    }

    /// Partial sheet at three quarters of the screen, full sheet at all of it.
    #[must_use]
    pub fn from_screen_height(screen_height: f64) -> Self {
        Self::new(screen_height * PARTIAL_SCREEN_RATIO, screen_height)
    }

    /// Resting height for `state`. A closed sheet keeps the modal height.
    #[must_use]
    pub fn height_for(&self, state: SheetState) -> f64 {
        match state {
            SheetState::Full => self.full_height,
            SheetState::Partial | SheetState::Closed => self.modal_height,
        }
    }
}

impl Default for SheetGeometry {
    fn default() -> Self {
        Self::from_screen_height(800.0)
    }
}

/// Release thresholds for the state table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct Thresholds {
    /// Upward distance (px) that expands a partial sheet.
    pub expand_threshold_px: f64,
    /// Fraction of the modal height a downward drag must exceed to close.
    pub close_ratio: f64,
    /// Downward distance (px) that collapses a full sheet.
    pub collapse_threshold_px: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            expand_threshold_px: 50.0,
            close_ratio: 0.2,
            collapse_threshold_px: 50.0,
        }
    }
}

/// Corner radii in px.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CornerRadii {
    /// Resting radius when partial.
    pub partial: f64,
    /// Resting radius when full.
    pub full: f64,
    /// Radius reached at full drag progress.
    pub max: f64,
}

impl CornerRadii {
    /// Resting radius for `state`.
    #[must_use]
    pub fn base_for(&self, state: SheetState) -> f64 {
        match state {
            SheetState::Full => self.full,
            SheetState::Partial | SheetState::Closed => self.partial,
        }
    }
}

impl Default for CornerRadii {
    fn default() -> Self {
        Self {
            partial: 24.0,
            full: 0.0,
            max: MAX_CORNER_RADIUS,
        }
    }
}

/// Curves and limits for transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct MotionConfig {
    pub open_duration_ms: u64,
    pub open_easing: Easing,
    pub close_duration_ms: u64,
    pub close_easing: Easing,
    /// Spring for expand, collapse, and snap-back.
    pub spring: SpringParams,
    /// Hard ceiling after which a transition completes at its target.
    pub timeout_ms: u64,
    /// Closeness at which a spring transition is considered finished.
    pub tolerance: FrameTolerance,
}

impl MotionConfig {
    #[must_use]
    pub fn open_duration(&self) -> Duration {
        Duration::from_millis(self.open_duration_ms)
    }

    #[must_use]
    pub fn close_duration(&self) -> Duration {
        Duration::from_millis(self.close_duration_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            open_duration_ms: 250,
            open_easing: Easing::EaseOut,
            close_duration_ms: 200,
            close_easing: Easing::EaseInOut,
            spring: SpringParams::default(),
            timeout_ms: 1000,
            tolerance: FrameTolerance::default(),
        }
    }
}

/// Everything a [`SheetHost`](super::SheetHost) needs to know from its host.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetConfig {
    pub geometry: SheetGeometry,
    pub thresholds: Thresholds,
    /// `Partial` or `Full`.
    pub initial_state: SheetState,
    pub radii: CornerRadii,
    pub motion: MotionConfig,
    /// Distance a drag must travel before it moves the sheet.
    pub touch_slop_px: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            geometry: SheetGeometry::default(),
            thresholds: Thresholds::default(),
            initial_state: SheetState::Partial,
            radii: CornerRadii::default(),
            motion: MotionConfig::default(),
            touch_slop_px: 0.0,
        }
    }
}

impl SheetConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The comments overlay: partial at 75% of the screen, 20px touch slop.
    #[must_use]
    pub fn comments(screen_height: f64) -> Self {
        Self {
            geometry: SheetGeometry::from_screen_height(screen_height),
            touch_slop_px: 20.0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn geometry(mut self, geometry: SheetGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    #[must_use]
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn initial_state(mut self, state: SheetState) -> Self {
        self.initial_state = state;
        self
    }

    #[must_use]
    pub fn radii(mut self, radii: CornerRadii) -> Self {
        self.radii = radii;
        self
    }

    #[must_use]
    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn touch_slop_px(mut self, slop: f64) -> Self {
        self.touch_slop_px = slop;
        self
    }

    /// Check every field. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let g = &self.geometry;
        if !(g.modal_height.is_finite() && g.modal_height > 0.0) {
            errors.push(format!(
                "geometry.modal_height must be > 0, got {}",
                g.modal_height
            ));
        }
        if !(g.full_height.is_finite() && g.full_height >= g.modal_height) {
            errors.push(format!(
                "geometry.full_height must be >= modal_height ({}), got {}",
                g.modal_height, g.full_height
            ));
        }

        let t = &self.thresholds;
        if !(t.expand_threshold_px.is_finite() && t.expand_threshold_px >= 0.0) {
            errors.push(format!(
                "thresholds.expand_threshold_px must be >= 0, got {}",
                t.expand_threshold_px
            ));
        }
        if !(t.close_ratio > 0.0 && t.close_ratio <= 1.0) {
            errors.push(format!(
                "thresholds.close_ratio must be in (0, 1], got {}",
                t.close_ratio
            ));
        }
        if !(t.collapse_threshold_px.is_finite() && t.collapse_threshold_px >= 0.0) {
            errors.push(format!(
                "thresholds.collapse_threshold_px must be >= 0, got {}",
                t.collapse_threshold_px
            ));
        }

        if self.initial_state == SheetState::Closed {
            errors.push("initial_state must be partial or full".into());
        }

        let r = &self.radii;
        for (name, value) in [("partial", r.partial), ("full", r.full), ("max", r.max)] {
            if !(0.0..=MAX_CORNER_RADIUS).contains(&value) {
                errors.push(format!(
                    "radii.{name} must be in [0, {MAX_CORNER_RADIUS}], got {value}"
                ));
            }
        }
        if r.partial > r.max || r.full > r.max {
            errors.push("radii.max must be >= radii.partial and radii.full".into());
        }

        let m = &self.motion;
        if !(m.spring.tension.is_finite() && m.spring.tension > 0.0) {
            errors.push(format!(
                "motion.spring.tension must be > 0, got {}",
                m.spring.tension
            ));
        }
        if !(m.spring.friction.is_finite() && m.spring.friction >= 0.0) {
            errors.push(format!(
                "motion.spring.friction must be >= 0, got {}",
                m.spring.friction
            ));
        }
        if m.timeout_ms == 0 || m.timeout_ms > MAX_TIMEOUT_MS {
            errors.push(format!(
                "motion.timeout_ms must be in [1, {MAX_TIMEOUT_MS}], got {}",
                m.timeout_ms
            ));
        }
        if !(m.tolerance.position_px > 0.0 && m.tolerance.unit > 0.0) {
            errors.push("motion.tolerance values must be > 0".into());
        }

        if !(self.touch_slop_px.is_finite() && self.touch_slop_px >= 0.0) {
            errors.push(format!(
                "touch_slop_px must be >= 0, got {}",
                self.touch_slop_px
            ));
        }

        errors
    }

    /// Return `self` if valid.
    pub fn validated(self) -> Result<Self, SheetError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SheetError::InvalidConfig(errors))
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a sheet configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl From<ConfigError> for SheetError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation(errors) => SheetError::InvalidConfig(errors),
            other => SheetError::InvalidConfig(vec![other.to_string()]),
        }
    }
}
