//! Contact acquisition parameters and presets.
//!
//! All distances are in metres, times in seconds, speeds in metres per
//! second and angular speeds in radians per second.

use nalgebra::Vector3;
use patch_types::{NORMALIZE_EPSILON, Plane};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AcquireError, AcquireResult};

/// Tuning for the contact acquisition pipeline.
///
/// Two presets cover the common cases: [`ContactParams::rigid_default`]
/// (also the [`Default`]) is strict, [`ContactParams::soft_body`] widens the
/// hysteresis band and disables the filters that assume rigid geometry.
///
/// # Example
///
/// ```
/// use patch_acquire::ContactParams;
///
/// // Start from a preset and override what you need
/// let params = ContactParams::soft_body()
///     .with_hold_frames(5)
///     .with_ema(true);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ContactParams {
    /// A node at or below this signed distance is in contact (m).
    pub enter_distance: f64,

    /// A node above this signed distance was out of contact (m).
    ///
    /// Must not be smaller than `enter_distance`.
    pub exit_distance: f64,

    /// Manifold contacts separated by more than this are dropped (m).
    pub max_separation: f64,

    /// Maximum number of manifolds scanned per frame.
    pub max_manifolds: usize,

    /// Cell size of the (x, z) deduplication grid (m).
    pub grid_cell_xz: f64,

    /// Points closer than this to an already kept point are dropped (m).
    pub min_pair_distance: f64,

    /// Largest tolerated standard deviation of signed distances (m).
    pub max_vertical_spread: f64,

    /// Approach speed along the normal that admits a node early (m/s).
    pub min_approach_speed: f64,

    /// Radius of the neighbor-support test (m).
    pub neighbor_radius: f64,

    /// Neighbors required within `neighbor_radius` to keep a point.
    pub min_neighbors: usize,

    /// Time constant of the centroid smoothing (s).
    pub ema_time_constant: f64,

    /// Consecutive rejected frames that may reuse the last good frame.
    pub hold_frames: usize,

    /// Filtered sets larger than this are subsampled down to it.
    pub target_contacts: usize,

    /// Upper bound on raw candidates gathered per frame.
    pub max_candidates: usize,

    /// Below this many filtered points a frame is degraded.
    pub min_quality_contacts: usize,

    /// At or below this many filtered points, synthetic points are added.
    pub synthetic_threshold: usize,

    /// Mesh vertices within this distance of the contact plane form the
    /// silhouette used for synthetic points (m).
    pub synthetic_band: f64,

    /// Angular speed above which edge midpoints are also synthesized (rad/s).
    pub spin_threshold: f64,

    /// Normal of the ground plane.
    pub ground_normal: Vector3<f64>,

    /// Signed offset of the ground plane along its normal (m).
    pub ground_offset: f64,

    /// Drop manifold contacts separated by more than `max_separation`.
    pub use_distance_filter: bool,

    /// Track entering transitions across the hysteresis band.
    pub use_hysteresis: bool,

    /// Admit nodes moving toward the ground faster than `min_approach_speed`.
    pub use_velocity_gate: bool,

    /// Keep one point per grid cell and enforce `min_pair_distance`.
    pub use_grid_dedup: bool,

    /// Reject signed-distance outliers by interquartile range.
    pub use_iqr_rejection: bool,

    /// Drop unsupported points on soft bodies.
    pub use_neighbor_filter: bool,

    /// Smooth the geometric center over time.
    pub use_ema: bool,

    /// Flag degraded and rejected frames.
    pub use_quality_gates: bool,

    /// Reject frames whose signed distances spread too far.
    pub use_vertical_spread_gate: bool,

    /// Reuse the last good frame when a frame is rejected.
    pub use_hold_last: bool,

    /// Add silhouette corners when real contacts are sparse.
    pub use_synthetic_augmentation: bool,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self::rigid_default()
    }
}

impl ContactParams {
    /// Strict preset for rigid bodies.
    #[must_use]
    pub fn rigid_default() -> Self {
        Self {
            enter_distance: 0.004,      // 4 mm
            exit_distance: 0.010,       // 10 mm
            max_separation: 0.010,      // 10 mm
            max_manifolds: 64,
            grid_cell_xz: 0.004,        // 4 mm
            min_pair_distance: 0.002,   // 2 mm
            max_vertical_spread: 0.008, // 8 mm
            min_approach_speed: 0.05,   // 5 cm/s
            neighbor_radius: 0.02,      // 2 cm
            min_neighbors: 2,
            ema_time_constant: 0.05, // 50 ms
            hold_frames: 3,
            target_contacts: 64,
            max_candidates: 512,
            min_quality_contacts: 4,
            synthetic_threshold: 4,
            synthetic_band: 0.02, // 2 cm
            spin_threshold: 5.0,  // rad/s
            ground_normal: Vector3::y(),
            ground_offset: 0.0,
            use_distance_filter: true,
            use_hysteresis: true,
            use_velocity_gate: true,
            use_grid_dedup: true,
            use_iqr_rejection: true,
            use_neighbor_filter: true,
            use_ema: true,
            use_quality_gates: true,
            use_vertical_spread_gate: true,
            use_hold_last: true,
            use_synthetic_augmentation: true,
        }
    }

    /// Lenient preset for deformable bodies.
    ///
    /// Deforming geometry spreads vertically and jitters from frame to frame,
    /// so IQR rejection, the vertical-spread gate and EMA smoothing are off.
    #[must_use]
    pub fn soft_body() -> Self {
        Self {
            enter_distance: 0.015,
            exit_distance: 0.025,
            max_separation: 0.03,
            grid_cell_xz: 0.01,
            max_vertical_spread: 0.03,
            use_iqr_rejection: false,
            use_vertical_spread_gate: false,
            use_ema: false,
            ..Self::rigid_default()
        }
    }

    /// Set the hysteresis band.
    #[must_use]
    pub const fn with_thresholds(mut self, enter: f64, exit: f64) -> Self {
        self.enter_distance = enter;
        self.exit_distance = exit;
        self
    }

    /// Set the manifold separation limit.
    #[must_use]
    pub const fn with_max_separation(mut self, max_separation: f64) -> Self {
        self.max_separation = max_separation;
        self
    }

    /// Set the deduplication cell size and minimum pair distance.
    #[must_use]
    pub const fn with_dedup(mut self, grid_cell_xz: f64, min_pair_distance: f64) -> Self {
        self.grid_cell_xz = grid_cell_xz;
        self.min_pair_distance = min_pair_distance;
        self
    }

    /// Set the vertical spread limit.
    #[must_use]
    pub const fn with_max_vertical_spread(mut self, spread: f64) -> Self {
        self.max_vertical_spread = spread;
        self
    }

    /// Set the neighbor-support radius and count.
    #[must_use]
    pub const fn with_neighbor_support(mut self, radius: f64, min_neighbors: usize) -> Self {
        self.neighbor_radius = radius;
        self.min_neighbors = min_neighbors;
        self
    }

    /// Set the centroid smoothing time constant.
    #[must_use]
    pub const fn with_ema_time_constant(mut self, tau: f64) -> Self {
        self.ema_time_constant = tau;
        self
    }

    /// Set the hold-last budget.
    #[must_use]
    pub const fn with_hold_frames(mut self, frames: usize) -> Self {
        self.hold_frames = frames;
        self
    }

    /// Set the subsampling target.
    #[must_use]
    pub const fn with_target_contacts(mut self, target: usize) -> Self {
        self.target_contacts = target;
        self
    }

    /// Set the ground plane.
    #[must_use]
    pub const fn with_ground(mut self, normal: Vector3<f64>, offset: f64) -> Self {
        self.ground_normal = normal;
        self.ground_offset = offset;
        self
    }

    /// Enable or disable the manifold separation filter.
    #[must_use]
    pub const fn with_distance_filter(mut self, enabled: bool) -> Self {
        self.use_distance_filter = enabled;
        self
    }

    /// Enable or disable hysteresis tracking.
    #[must_use]
    pub const fn with_hysteresis(mut self, enabled: bool) -> Self {
        self.use_hysteresis = enabled;
        self
    }

    /// Enable or disable the approach velocity gate.
    #[must_use]
    pub const fn with_velocity_gate(mut self, enabled: bool) -> Self {
        self.use_velocity_gate = enabled;
        self
    }

    /// Enable or disable grid deduplication.
    #[must_use]
    pub const fn with_grid_dedup(mut self, enabled: bool) -> Self {
        self.use_grid_dedup = enabled;
        self
    }

    /// Enable or disable IQR outlier rejection.
    #[must_use]
    pub const fn with_iqr_rejection(mut self, enabled: bool) -> Self {
        self.use_iqr_rejection = enabled;
        self
    }

    /// Enable or disable neighbor-support filtering.
    #[must_use]
    pub const fn with_neighbor_filter(mut self, enabled: bool) -> Self {
        self.use_neighbor_filter = enabled;
        self
    }

    /// Enable or disable centroid smoothing.
    #[must_use]
    pub const fn with_ema(mut self, enabled: bool) -> Self {
        self.use_ema = enabled;
        self
    }

    /// Enable or disable the quality gates.
    #[must_use]
    pub const fn with_quality_gates(mut self, enabled: bool) -> Self {
        self.use_quality_gates = enabled;
        self
    }

    /// Enable or disable the vertical spread gate.
    #[must_use]
    pub const fn with_vertical_spread_gate(mut self, enabled: bool) -> Self {
        self.use_vertical_spread_gate = enabled;
        self
    }

    /// Enable or disable hold-last.
    #[must_use]
    pub const fn with_hold_last(mut self, enabled: bool) -> Self {
        self.use_hold_last = enabled;
        self
    }

    /// Enable or disable synthetic augmentation.
    #[must_use]
    pub const fn with_synthetic_augmentation(mut self, enabled: bool) -> Self {
        self.use_synthetic_augmentation = enabled;
        self
    }

    /// The configured ground plane, or `None` if its normal is degenerate.
    #[must_use]
    pub fn ground_plane(&self) -> Option<Plane> {
        Plane::from_normal_offset(self.ground_normal, self.ground_offset)
    }

    /// Returns a copy with every invalid value replaced.
    ///
    /// Negative or non-finite quantities fall back to the rigid preset's
    /// value, an exit threshold below the enter threshold is raised to it, and
    /// zero subsampling targets become one. Each correction is logged.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::rigid_default();
        let fields: [(&'static str, &mut f64, f64); 11] = [
            ("enter_distance", &mut self.enter_distance, defaults.enter_distance),
            ("exit_distance", &mut self.exit_distance, defaults.exit_distance),
            ("max_separation", &mut self.max_separation, defaults.max_separation),
            ("grid_cell_xz", &mut self.grid_cell_xz, defaults.grid_cell_xz),
            ("min_pair_distance", &mut self.min_pair_distance, defaults.min_pair_distance),
            ("max_vertical_spread", &mut self.max_vertical_spread, defaults.max_vertical_spread),
            ("min_approach_speed", &mut self.min_approach_speed, defaults.min_approach_speed),
            ("neighbor_radius", &mut self.neighbor_radius, defaults.neighbor_radius),
            ("ema_time_constant", &mut self.ema_time_constant, defaults.ema_time_constant),
            ("synthetic_band", &mut self.synthetic_band, defaults.synthetic_band),
            ("spin_threshold", &mut self.spin_threshold, defaults.spin_threshold),
        ];
        for (field, value, fallback) in fields {
            if !value.is_finite() || *value < 0.0 {
                warn!(field, value = *value, fallback, "Contact parameter replaced");
                *value = fallback;
            }
        }

        if self.exit_distance < self.enter_distance {
            warn!(
                enter = self.enter_distance,
                exit = self.exit_distance,
                "Exit threshold raised to enter threshold"
            );
            self.exit_distance = self.enter_distance;
        }

        let len = self.ground_normal.norm();
        if len.is_finite() && len > NORMALIZE_EPSILON {
            self.ground_normal /= len;
        } else {
            warn!(norm = len, "Degenerate ground normal replaced with +Y");
            self.ground_normal = Vector3::y();
        }
        if !self.ground_offset.is_finite() {
            warn!(value = self.ground_offset, "Ground offset replaced with 0");
            self.ground_offset = 0.0;
        }

        if self.target_contacts == 0 {
            warn!("Raised target_contacts to 1");
            self.target_contacts = 1;
        }
        if self.max_candidates == 0 {
            warn!("Raised max_candidates to 1");
            self.max_candidates = 1;
        }
        self
    }

    /// Validate the parameters without modifying them.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::InvalidParams`] for the first negative or
    /// non-finite quantity, and [`AcquireError::InconsistentThresholds`] when
    /// the hysteresis band is inverted.
    pub fn validate(&self) -> AcquireResult<()> {
        let fields = [
            ("enter_distance", self.enter_distance),
            ("exit_distance", self.exit_distance),
            ("max_separation", self.max_separation),
            ("grid_cell_xz", self.grid_cell_xz),
            ("min_pair_distance", self.min_pair_distance),
            ("max_vertical_spread", self.max_vertical_spread),
            ("min_approach_speed", self.min_approach_speed),
            ("neighbor_radius", self.neighbor_radius),
            ("ema_time_constant", self.ema_time_constant),
            ("synthetic_band", self.synthetic_band),
            ("spin_threshold", self.spin_threshold),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AcquireError::invalid_params(field, value));
            }
        }
        if !self.ground_offset.is_finite() {
            return Err(AcquireError::invalid_params("ground_offset", self.ground_offset));
        }
        let len = self.ground_normal.norm();
        if !len.is_finite() || len <= NORMALIZE_EPSILON {
            return Err(AcquireError::invalid_params("ground_normal", len));
        }
        if self.exit_distance < self.enter_distance {
            return Err(AcquireError::inconsistent(format!(
                "exit_distance {} is below enter_distance {}",
                self.exit_distance, self.enter_distance
            )));
        }
        if self.target_contacts == 0 {
            return Err(AcquireError::invalid_params("target_contacts", 0.0));
        }
        if self.max_candidates == 0 {
            return Err(AcquireError::invalid_params("max_candidates", 0.0));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        assert!(ContactParams::rigid_default().validate().is_ok());
        assert!(ContactParams::soft_body().validate().is_ok());
        assert_eq!(ContactParams::default(), ContactParams::rigid_default());
    }

    #[test]
    fn test_soft_preset_widens_band() {
        let rigid = ContactParams::rigid_default();
        let soft = ContactParams::soft_body();
        assert!(soft.enter_distance > rigid.enter_distance);
        assert!(soft.exit_distance > rigid.exit_distance);
        assert!(!soft.use_iqr_rejection);
        assert!(!soft.use_vertical_spread_gate);
        assert!(!soft.use_ema);
        assert!(soft.use_hysteresis);
        assert!(soft.use_neighbor_filter);
        assert!(soft.use_hold_last);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let params = ContactParams::default().with_max_separation(-1.0);
        assert_eq!(
            params.validate(),
            Err(AcquireError::invalid_params("max_separation", -1.0))
        );
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let params = ContactParams::default().with_thresholds(0.02, 0.01);
        assert!(matches!(
            params.validate(),
            Err(AcquireError::InconsistentThresholds(_))
        ));
    }

    #[test]
    fn test_sanitized_replaces_invalid() {
        let params = ContactParams::default()
            .with_thresholds(f64::NAN, 0.001)
            .with_ema_time_constant(-3.0)
            .with_ground(Vector3::zeros(), f64::INFINITY)
            .with_target_contacts(0)
            .sanitized();

        assert_eq!(params.enter_distance, 0.004);
        // Raised to the enter threshold
        assert_eq!(params.exit_distance, 0.004);
        assert_eq!(params.ema_time_constant, 0.05);
        assert_eq!(params.ground_normal, Vector3::y());
        assert_eq!(params.ground_offset, 0.0);
        assert_eq!(params.target_contacts, 1);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_sanitized_normalizes_ground() {
        let params = ContactParams::default()
            .with_ground(Vector3::new(0.0, 2.0, 0.0), 0.5)
            .sanitized();
        assert!((params.ground_normal.norm() - 1.0).abs() < 1e-12);
        let plane = params.ground_plane().unwrap_or_else(|| Plane::ground(0.0));
        assert!((plane.offset() - 0.5).abs() < 1e-12);
    }
}
