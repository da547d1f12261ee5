//! Fitter configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::error::{FitError, FitResult};

/// Rectangle fitting algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FitAlgorithm {
    /// Axis-aligned bounds.
    Aabb,
    /// Orientation from the dominant covariance eigenvector.
    Pca,
    /// Minimum-area rectangle via convex hull and rotating calipers.
    Ombb,
    /// Best of `k` evenly spaced orientations.
    Kdop {
        /// Number of orientations tested in `[0, π)`.
        k: usize,
    },
    /// k-DOP followed by local refinement within `tolerance` radians.
    Hybrid {
        /// Number of coarse orientations.
        k: usize,
        /// Half-width of the refinement window (radians).
        tolerance: f64,
    },
}

impl Default for FitAlgorithm {
    fn default() -> Self {
        Self::Hybrid {
            k: 16,
            tolerance: 0.05,
        }
    }
}

impl FitAlgorithm {
    /// Short stable name, used in logs and diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Aabb => "aabb",
            Self::Pca => "pca",
            Self::Ombb => "ombb",
            Self::Kdop { .. } => "kdop",
            Self::Hybrid { .. } => "hybrid",
        }
    }
}

/// Parameters for fitting and stabilizing the footprint box.
///
/// # Example
///
/// ```
/// use patch_fit::{FitAlgorithm, FitConfig};
///
/// let config = FitConfig::default()
///     .with_algorithm(FitAlgorithm::Ombb)
///     .with_min_size(0.005);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitConfig {
    /// Algorithm used when the velocity override does not apply.
    pub algorithm: FitAlgorithm,

    /// Floor for width and height (m).
    pub min_size: f64,

    /// Fixed box extent along the contact normal (m).
    pub depth: f64,

    /// Whether a fast-moving body takes its orientation from its heading.
    pub velocity_override: bool,

    /// Planar speed above which the heading overrides the fit (m/s).
    pub override_speed: f64,

    /// Angle jump above which a velocity-consistent frame is locked (radians).
    pub stability_threshold: f64,

    /// Minimum cosine between consecutive velocities to count as consistent.
    pub consistency_cosine: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            algorithm: FitAlgorithm::default(),
            min_size: 0.01,                         // 1 cm floor
            depth: 0.002,                           // 2 mm slab
            velocity_override: true,
            override_speed: 0.5,                    // 0.5 m/s
            stability_threshold: 25f64.to_radians(), // 25°
            consistency_cosine: 0.8,
        }
    }
}

impl FitConfig {
    /// Set the fitting algorithm.
    #[must_use]
    pub const fn with_algorithm(mut self, algorithm: FitAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the width/height floor.
    #[must_use]
    pub const fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the box depth.
    #[must_use]
    pub const fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    /// Enable or disable the velocity heading override.
    #[must_use]
    pub const fn with_velocity_override(mut self, enabled: bool) -> Self {
        self.velocity_override = enabled;
        self
    }

    /// Set the orientation lock threshold (radians).
    #[must_use]
    pub const fn with_stability_threshold(mut self, threshold: f64) -> Self {
        self.stability_threshold = threshold;
        self
    }

    /// Returns a copy with every invalid value replaced.
    ///
    /// Negative or non-finite quantities fall back to the default
    /// configuration's value, as do an out-of-range consistency cosine, a
    /// zero orientation count and a bad refinement tolerance. Each
    /// correction is logged.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fields: [(&'static str, &mut f64, f64); 4] = [
            ("min_size", &mut self.min_size, defaults.min_size),
            ("depth", &mut self.depth, defaults.depth),
            ("override_speed", &mut self.override_speed, defaults.override_speed),
            (
                "stability_threshold",
                &mut self.stability_threshold,
                defaults.stability_threshold,
            ),
        ];
        for (field, value, fallback) in fields {
            if !value.is_finite() || *value < 0.0 {
                warn!(field, value = *value, fallback, "Fit parameter replaced");
                *value = fallback;
            }
        }

        if !(-1.0..=1.0).contains(&self.consistency_cosine) {
            warn!(
                value = self.consistency_cosine,
                fallback = defaults.consistency_cosine,
                "Consistency cosine replaced"
            );
            self.consistency_cosine = defaults.consistency_cosine;
        }

        let (default_k, default_tolerance) = match defaults.algorithm {
            FitAlgorithm::Hybrid { k, tolerance } => (k, tolerance),
            _ => (16, 0.05),
        };
        match &mut self.algorithm {
            FitAlgorithm::Kdop { k } | FitAlgorithm::Hybrid { k, .. } if *k == 0 => {
                warn!(fallback = default_k, "Raised orientation count from 0");
                *k = default_k;
            }
            _ => {}
        }
        if let FitAlgorithm::Hybrid { tolerance, .. } = &mut self.algorithm {
            if !tolerance.is_finite() || *tolerance < 0.0 {
                warn!(value = *tolerance, fallback = default_tolerance, "Refinement tolerance replaced");
                *tolerance = default_tolerance;
            }
        }
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> FitResult<()> {
        let non_negative = [
            ("min_size", self.min_size),
            ("depth", self.depth),
            ("override_speed", self.override_speed),
            ("stability_threshold", self.stability_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FitError::invalid_config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !(-1.0..=1.0).contains(&self.consistency_cosine) {
            return Err(FitError::invalid_config(format!(
                "consistency_cosine must be in [-1, 1], got {}",
                self.consistency_cosine
            )));
        }
        match self.algorithm {
            FitAlgorithm::Kdop { k: 0 } | FitAlgorithm::Hybrid { k: 0, .. } => {
                Err(FitError::invalid_config("k must be at least 1"))
            }
            FitAlgorithm::Hybrid { tolerance, .. } if !tolerance.is_finite() || tolerance < 0.0 => {
                Err(FitError::invalid_config(format!(
                    "tolerance must be finite and non-negative, got {tolerance}"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        let config = FitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.algorithm.name(), "hybrid");
        assert!((config.stability_threshold - 0.436_332).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_negative_min_size() {
        let config = FitConfig::default().with_min_size(-0.1);
        assert!(matches!(config.validate(), Err(FitError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_k() {
        let config = FitConfig::default().with_algorithm(FitAlgorithm::Kdop { k: 0 });
        assert!(config.validate().is_err());
        let config = FitConfig::default().with_algorithm(FitAlgorithm::Hybrid {
            k: 16,
            tolerance: f64::NAN,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitized_replaces_bad_values() {
        let config = FitConfig {
            algorithm: FitAlgorithm::Hybrid {
                k: 0,
                tolerance: f64::INFINITY,
            },
            min_size: -5.0,
            depth: f64::NAN,
            consistency_cosine: 2.0,
            ..FitConfig::default()
        };
        assert!(config.validate().is_err());

        let fixed = config.sanitized();
        assert!(fixed.validate().is_ok());
        assert!((fixed.min_size - 0.01).abs() < f64::EPSILON);
        assert!((fixed.depth - 0.002).abs() < f64::EPSILON);
        assert!((fixed.consistency_cosine - 0.8).abs() < f64::EPSILON);
        assert_eq!(fixed.algorithm, FitAlgorithm::default());
    }

    #[test]
    fn test_sanitized_keeps_valid_config() {
        let config = FitConfig::default()
            .with_algorithm(FitAlgorithm::Kdop { k: 8 })
            .with_min_size(0.0)
            .with_depth(0.05);
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_builder_pattern() {
        let config = FitConfig::default()
            .with_algorithm(FitAlgorithm::Pca)
            .with_depth(0.01)
            .with_velocity_override(false)
            .with_stability_threshold(0.2);
        assert_eq!(config.algorithm, FitAlgorithm::Pca);
        assert!((config.depth - 0.01).abs() < f64::EPSILON);
        assert!(!config.velocity_override);
        assert!((config.stability_threshold - 0.2).abs() < f64::EPSILON);
    }
}
