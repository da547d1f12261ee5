//! Error types for geometry primitives.

/// Errors that can occur when constructing geometry primitives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum GeometryError {
    /// The grid cell size must be positive and finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    /// A plane normal had zero (or near-zero) length.
    #[error("plane normal is degenerate (near-zero length)")]
    DegenerateNormal,

    /// A required coordinate or scalar was NaN or infinite.
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),
}

/// Result type alias for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeometryError::InvalidCellSize(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = GeometryError::DegenerateNormal;
        assert!(err.to_string().contains("degenerate"));

        let err = GeometryError::NonFinite("anchor");
        assert!(err.to_string().contains("anchor"));
    }
}
