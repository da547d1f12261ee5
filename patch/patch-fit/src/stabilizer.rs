//! Frame-to-frame orientation stabilization.
//!
//! A fast body whose heading barely changes should not see its footprint
//! flip when the heading-aligned fit jumps. When consecutive velocities agree
//! and the new orientation jumped by more than a threshold, the stabilizer
//! re-projects the same points at the previous orientation instead.
//!
//! The stored orientation is always the newly *computed* one, so a lock only
//! holds for the frame it happens in.

use nalgebra::{Point2, Vector2};
use patch_types::{BoundingBox2D, angle_difference};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FitConfig;
use crate::fitter::FitOutcome;
use crate::obb::project_at;

/// Result of one stabilization step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StabilizedFit {
    /// The box to report for this frame.
    pub bbox: BoundingBox2D,
    /// Whether the orientation was frozen at the previous frame's value.
    pub locked: bool,
    /// Shortest signed jump from the previous orientation, if one existed.
    pub theta_jump: Option<f64>,
}

/// Cross-frame orientation memory for one tracked body.
///
/// # Example
///
/// ```
/// use patch_fit::{BoxFitter, FitConfig, OrientationStabilizer};
/// use nalgebra::{Point2, Vector2};
///
/// let fitter = BoxFitter::new(FitConfig::default());
/// let mut stabilizer = OrientationStabilizer::from_config(fitter.config());
/// let pts = [Point2::new(0.0, 0.0), Point2::new(0.1, 0.05), Point2::new(0.0, 0.05)];
///
/// let v = Vector2::new(1.0, 0.0);
/// let outcome = fitter.fit(&pts, v).unwrap();
/// let first = stabilizer.stabilize(&pts, &outcome, v, 0.01);
/// assert!(!first.locked);
/// assert_eq!(stabilizer.previous_theta(), Some(outcome.bbox.theta));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationStabilizer {
    threshold: f64,
    min_speed: f64,
    consistency_cosine: f64,
    prev_velocity: Vector2<f64>,
    prev_theta: Option<f64>,
}

impl Default for OrientationStabilizer {
    fn default() -> Self {
        Self::from_config(&FitConfig::default())
    }
}

impl OrientationStabilizer {
    /// Creates a stabilizer with the given lock threshold (radians) and the
    /// default speed and consistency limits.
    ///
    /// Non-finite or negative thresholds are treated as zero.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let defaults = FitConfig::default();
        Self {
            threshold: non_negative(threshold),
            min_speed: defaults.override_speed,
            consistency_cosine: defaults.consistency_cosine,
            prev_velocity: Vector2::zeros(),
            prev_theta: None,
        }
    }

    /// Creates a stabilizer using the limits in a [`FitConfig`].
    #[must_use]
    pub fn from_config(config: &FitConfig) -> Self {
        Self {
            threshold: non_negative(config.stability_threshold),
            min_speed: non_negative(config.override_speed),
            consistency_cosine: if config.consistency_cosine.is_finite() {
                config.consistency_cosine.clamp(-1.0, 1.0)
            } else {
                FitConfig::default().consistency_cosine
            },
            prev_velocity: Vector2::zeros(),
            prev_theta: None,
        }
    }

    /// Returns a copy primed with a previous frame's velocity and orientation.
    #[must_use]
    pub fn seeded(mut self, prev_velocity: Vector2<f64>, prev_theta: f64) -> Self {
        self.prev_velocity = prev_velocity;
        self.prev_theta = Some(prev_theta);
        self
    }

    /// Lock threshold (radians).
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Orientation stored from the previous call.
    #[must_use]
    pub const fn previous_theta(&self) -> Option<f64> {
        self.prev_theta
    }

    /// Velocity stored from the previous call.
    #[must_use]
    pub const fn previous_velocity(&self) -> Vector2<f64> {
        self.prev_velocity
    }

    /// True when both `velocity` and the stored velocity exceed the speed
    /// limit and point in nearly the same direction.
    #[must_use]
    pub fn is_velocity_consistent(&self, velocity: Vector2<f64>) -> bool {
        let speed = velocity.norm();
        let prev_speed = self.prev_velocity.norm();
        if !(speed > self.min_speed && prev_speed > self.min_speed) {
            return false;
        }
        velocity.dot(&self.prev_velocity) / (speed * prev_speed) > self.consistency_cosine
    }

    /// Applies the orientation lock to a fresh fit and updates the memory.
    ///
    /// `points` must be the set `outcome` was fitted to. The stored velocity
    /// and orientation are overwritten with this frame's values whether or
    /// not the box was locked.
    pub fn stabilize(
        &mut self,
        points: &[Point2<f64>],
        outcome: &FitOutcome,
        velocity: Vector2<f64>,
        min_size: f64,
    ) -> StabilizedFit {
        let theta = outcome.bbox.theta;
        let theta_jump = self.prev_theta.map(|prev| angle_difference(theta, prev));

        let mut result = StabilizedFit {
            bbox: outcome.bbox,
            locked: false,
            theta_jump,
        };

        if let (Some(prev_theta), Some(jump)) = (self.prev_theta, theta_jump) {
            if outcome.used_velocity_override()
                && jump.abs() > self.threshold
                && self.is_velocity_consistent(velocity)
            {
                if let Some(bbox) = project_at(points, prev_theta, min_size) {
                    debug!(theta, prev_theta, jump, "Footprint orientation locked");
                    result.bbox = bbox;
                    result.locked = true;
                }
            }
        }

        self.prev_velocity = velocity;
        self.prev_theta = Some(theta);
        result
    }

    /// Forgets the previous frame.
    pub fn reset(&mut self) {
        self.prev_velocity = Vector2::zeros();
        self.prev_theta = None;
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
