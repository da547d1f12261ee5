//! Algorithm dispatch with the velocity heading override.

use nalgebra::{Point2, Vector2};
use patch_types::BoundingBox2D;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{FitAlgorithm, FitConfig};
use crate::error::{FitError, FitResult};
use crate::obb::{fit_aabb, fit_hybrid, fit_kdop, fit_ombb, fit_pca, project_at};

/// How a fitted box got its orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrientationSource {
    /// The configured geometric algorithm.
    Geometric(FitAlgorithm),
    /// The body's planar velocity heading.
    VelocityHeading,
}

/// A fitted box plus how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitOutcome {
    /// The fitted rectangle in the input frame.
    pub bbox: BoundingBox2D,
    /// Where the orientation came from.
    pub source: OrientationSource,
}

impl FitOutcome {
    /// True when the orientation was taken from the velocity heading.
    #[must_use]
    pub const fn used_velocity_override(&self) -> bool {
        matches!(self.source, OrientationSource::VelocityHeading)
    }
}

/// Fits footprint rectangles according to a [`FitConfig`].
///
/// # Example
///
/// ```
/// use patch_fit::{BoxFitter, FitConfig};
/// use nalgebra::{Point2, Vector2};
///
/// let fitter = BoxFitter::new(FitConfig::default());
/// let pts = [
///     Point2::new(0.0, 0.0),
///     Point2::new(0.2, 0.0),
///     Point2::new(0.2, 0.1),
///     Point2::new(0.0, 0.1),
/// ];
///
/// // Slow body: geometric fit
/// let still = fitter.fit(&pts, Vector2::new(0.1, 0.0)).unwrap();
/// assert!(!still.used_velocity_override());
///
/// // Fast body heading along +v: orientation follows the heading
/// let moving = fitter.fit(&pts, Vector2::new(0.0, 2.0)).unwrap();
/// assert!(moving.used_velocity_override());
/// assert!((moving.bbox.theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoxFitter {
    config: FitConfig,
}

impl BoxFitter {
    /// Creates a fitter.
    ///
    /// Invalid configuration values are replaced with defaults; see
    /// [`FitConfig::sanitized`].
    #[must_use]
    pub fn new(config: FitConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    /// Creates a fitter after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidConfig`] if [`FitConfig::validate`] fails.
    pub fn try_new(config: FitConfig) -> FitResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fits a box to `points`, applying the velocity override when the
    /// planar speed exceeds the configured threshold.
    ///
    /// Returns `None` for an empty point set.
    #[must_use]
    pub fn fit(&self, points: &[Point2<f64>], planar_velocity: Vector2<f64>) -> Option<FitOutcome> {
        if points.is_empty() {
            return None;
        }
        let min_size = self.config.min_size;
        let speed = planar_velocity.norm();

        if self.config.velocity_override && speed.is_finite() && speed > self.config.override_speed {
            let heading = planar_velocity.y.atan2(planar_velocity.x);
            trace!(speed, heading, "Footprint orientation from velocity heading");
            return project_at(points, heading, min_size).map(|bbox| FitOutcome {
                bbox,
                source: OrientationSource::VelocityHeading,
            });
        }

        let algorithm = self.config.algorithm;
        let bbox = match algorithm {
            FitAlgorithm::Aabb => fit_aabb(points, min_size),
            FitAlgorithm::Pca => fit_pca(points, min_size),
            FitAlgorithm::Ombb => fit_ombb(points, min_size),
            FitAlgorithm::Kdop { k } => fit_kdop(points, k, min_size),
            FitAlgorithm::Hybrid { k, tolerance } => fit_hybrid(points, k, tolerance, min_size),
        }?;
        trace!(
            algorithm = algorithm.name(),
            points = points.len(),
            theta = bbox.theta,
            "Footprint fitted"
        );
        Some(FitOutcome {
            bbox,
            source: OrientationSource::Geometric(algorithm),
        })
    }

    /// Like [`BoxFitter::fit`], but reports an empty point set as an error.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InsufficientPoints`] when `points` is empty.
    pub fn try_fit(&self, points: &[Point2<f64>], planar_velocity: Vector2<f64>) -> FitResult<FitOutcome> {
        self.fit(points, planar_velocity)
            .ok_or(FitError::insufficient_points(1, points.len()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.3, 0.0),
            Point2::new(0.3, 0.1),
            Point2::new(0.0, 0.1),
        ]
    }

    #[test]
    fn test_empty_points() {
        let fitter = BoxFitter::default();
        assert!(fitter.fit(&[], Vector2::zeros()).is_none());
        assert_eq!(
            fitter.try_fit(&[], Vector2::zeros()),
            Err(FitError::insufficient_points(1, 0))
        );
    }

    #[test]
    fn test_dispatch_each_algorithm() {
        for algorithm in [
            FitAlgorithm::Aabb,
            FitAlgorithm::Pca,
            FitAlgorithm::Ombb,
            FitAlgorithm::Kdop { k: 8 },
            FitAlgorithm::Hybrid {
                k: 16,
                tolerance: 0.05,
            },
        ] {
            let fitter = BoxFitter::new(FitConfig::default().with_algorithm(algorithm));
            let out = fitter.fit(&rect(), Vector2::zeros()).unwrap();
            assert_eq!(out.source, OrientationSource::Geometric(algorithm));
            assert_relative_eq!(out.bbox.area(), 0.03, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_override_threshold_is_strict() {
        let fitter = BoxFitter::default();
        let at_threshold = fitter.fit(&rect(), Vector2::new(0.5, 0.0)).unwrap();
        assert!(!at_threshold.used_velocity_override());
        let above = fitter.fit(&rect(), Vector2::new(0.0, -0.51)).unwrap();
        assert!(above.used_velocity_override());
        assert_relative_eq!(above.bbox.theta, -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_override_projects_at_heading() {
        let fitter = BoxFitter::default();
        let heading = 0.7_f64;
        let v = Vector2::new(heading.cos(), heading.sin()) * 3.0;
        let out = fitter.fit(&rect(), v).unwrap();
        let expected = project_at(&rect(), heading, fitter.config().min_size).unwrap();
        assert_relative_eq!(out.bbox.width, expected.width, epsilon = 1e-12);
        assert_relative_eq!(out.bbox.height, expected.height, epsilon = 1e-12);
        assert_relative_eq!(out.bbox.theta, heading, epsilon = 1e-12);
    }

    #[test]
    fn test_override_disabled() {
        let fitter = BoxFitter::new(FitConfig::default().with_velocity_override(false));
        let out = fitter.fit(&rect(), Vector2::new(5.0, 5.0)).unwrap();
        assert!(!out.used_velocity_override());
    }

    #[test]
    fn test_try_new_validates() {
        assert!(BoxFitter::try_new(FitConfig::default()).is_ok());
        assert!(BoxFitter::try_new(FitConfig::default().with_depth(f64::NAN)).is_err());
    }

    #[test]
    fn test_new_sanitizes() {
        let fitter = BoxFitter::new(FitConfig::default().with_depth(f64::NAN).with_min_size(-5.0));
        assert!(fitter.config().validate().is_ok());
        let out = fitter.fit(&[Point2::origin()], Vector2::zeros()).unwrap();
        assert_relative_eq!(out.bbox.width, FitConfig::default().min_size, epsilon = 1e-12);
    }
}
