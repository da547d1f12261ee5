//! Error types for box fitting configuration.

use thiserror::Error;

/// Result type alias for fitting operations.
pub type FitResult<T> = Result<T, FitError>;

/// Errors that can occur when configuring a box fitter.
///
/// Fitting itself never fails: degenerate point sets fall back to simpler
/// algorithms and an empty set yields no box.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Invalid fitter configuration.
    #[error("invalid fit configuration: {0}")]
    InvalidConfig(String),

    /// Not enough points for the requested operation.
    #[error("insufficient points: need {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },
}

impl FitError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    /// Create an insufficient points error.
    #[must_use]
    pub const fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }
}
