#![forbid(unsafe_code)]

//! Error taxonomy for the sheet controller.
//!
//! - [`SheetError::InvalidState`] is a contract violation by the caller's
//!   event wiring (a second `begin`, any mutation after the sheet closed).
//!   It is always propagated.
//! - [`SheetError::MalformedSample`] describes a rejected touch sample. The
//!   sampler recovers from these locally; only the `try_*` entry points and
//!   `begin` surface them.
//! - [`SheetError::InvalidConfig`] carries every validation failure found in
//!   a configuration at construction time.
//!
//! Animation timeouts are not errors.

use thiserror::Error;

/// Errors produced by the sheet controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    /// An operation was invoked in a state that cannot accept it.
    #[error("cannot {operation}: {reason}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// Why the current state rejects it.
        reason: &'static str,
    },
    /// A touch sample was rejected.
    #[error("malformed touch sample: {0}")]
    MalformedSample(#[from] MalformedSample),
    /// The configuration failed validation.
    #[error("invalid sheet configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}

impl SheetError {
    /// Shorthand for [`SheetError::InvalidState`].
    #[must_use]
    pub const fn invalid_state(operation: &'static str, reason: &'static str) -> Self {
        Self::InvalidState { operation, reason }
    }

    /// Whether this is a contract violation (as opposed to bad input data).
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

/// Reasons a touch sample is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MalformedSample {
    /// The y coordinate is NaN or infinite.
    #[error("non-finite coordinate y={y}")]
    NonFiniteCoordinate { y: f64 },
    /// The timestamp is NaN or infinite.
    #[error("non-finite timestamp t={t}")]
    NonFiniteTimestamp { t: f64 },
    /// The timestamp is earlier than the previous sample's.
    #[error("timestamp {t}ms precedes previous sample at {previous}ms")]
    NonMonotonicTimestamp { t: f64, previous: f64 },
}

/// Standard result type for sheet APIs.
pub type Result<T> = std::result::Result<T, SheetError>;
