//! Error types for contact acquisition configuration.

use thiserror::Error;

/// Result type alias for acquisition configuration.
pub type AcquireResult<T> = Result<T, AcquireError>;

/// Errors reported when validating [`ContactParams`](crate::ContactParams).
///
/// The per-frame pipeline itself never fails; these only come from
/// validating constructors.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AcquireError {
    /// A numeric parameter was negative or not finite.
    #[error("invalid parameter {field}: {value}")]
    InvalidParams {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Two parameters contradict each other.
    #[error("inconsistent thresholds: {0}")]
    InconsistentThresholds(String),
}

impl AcquireError {
    /// Create an invalid parameter error.
    #[must_use]
    pub const fn invalid_params(field: &'static str, value: f64) -> Self {
        Self::InvalidParams { field, value }
    }

    /// Create an inconsistent thresholds error.
    #[must_use]
    pub fn inconsistent(details: impl Into<String>) -> Self {
        Self::InconsistentThresholds(details.into())
    }
}
