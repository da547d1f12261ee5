//! Per-body footprint tracking.

use nalgebra::{Point2, Vector2};
use patch_acquire::{
    AcquisitionContext, AcquisitionResult, ContactAcquisitionPipeline, ContactParams,
    ContactState,
};
use patch_fit::{BoxFitter, FitConfig, OrientationStabilizer, StabilizedFit};
use patch_types::{OrientedBox3D, Plane};
use tracing::debug;

/// Output of one tracker update.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchFrame {
    /// Acquisition output, including quality flags and diagnostics.
    pub acquisition: AcquisitionResult,
    /// World-space footprint, when the frame has one.
    pub footprint: Option<OrientedBox3D>,
    /// Plane-local fit after orientation stabilization.
    pub fit: Option<StabilizedFit>,
}

impl PatchFrame {
    /// True when a footprint was produced.
    #[must_use]
    pub const fn has_footprint(&self) -> bool {
        self.footprint.is_some()
    }

    /// True when the footprint kept the previous frame's orientation.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.fit.is_some_and(|f| f.locked)
    }
}

/// Acquisition, fitting and stabilization for one tracked body.
///
/// Owns all cross-frame memory for that body. Call
/// [`ContactPatchTracker::reset`] when the body is replaced or teleported.
///
/// # Example
///
/// ```
/// use contact_patch::prelude::*;
///
/// let mut tracker = ContactPatchTracker::rigid();
/// let manifolds: ManifoldSet = [ContactManifold::new(
///     [(0.0, 0.0), (0.2, 0.0), (0.2, 0.1), (0.0, 0.1)]
///         .iter()
///         .map(|&(x, z)| ManifoldContact::new(Point3::new(x, 0.0, z), Vector3::y(), 0.0))
///         .collect(),
/// )]
/// .into_iter()
/// .collect();
/// let body = BodyMotion::at_rest();
///
/// let frame = tracker.update(&AcquisitionContext::rigid(0.0, &manifolds, &body));
/// let footprint = frame.footprint.unwrap();
/// assert!((footprint.area() - 0.02).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct ContactPatchTracker {
    pipeline: ContactAcquisitionPipeline,
    state: ContactState,
    fitter: BoxFitter,
    stabilizer: OrientationStabilizer,
}

impl Default for ContactPatchTracker {
    fn default() -> Self {
        Self::rigid()
    }
}

impl ContactPatchTracker {
    /// Creates a tracker.
    ///
    /// Invalid contact parameters and fit settings are replaced with safe
    /// defaults, each replacement logged.
    #[must_use]
    pub fn new(params: ContactParams, config: FitConfig) -> Self {
        let fitter = BoxFitter::new(config);
        let stabilizer = OrientationStabilizer::from_config(fitter.config());
        Self {
            pipeline: ContactAcquisitionPipeline::new(params),
            state: ContactState::new(),
            fitter,
            stabilizer,
        }
    }

    /// Tracker with the rigid-body preset.
    #[must_use]
    pub fn rigid() -> Self {
        Self::new(ContactParams::rigid_default(), FitConfig::default())
    }

    /// Tracker with the soft-body preset.
    #[must_use]
    pub fn soft() -> Self {
        Self::new(ContactParams::soft_body(), FitConfig::default())
    }

    /// The acquisition pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &ContactAcquisitionPipeline {
        &self.pipeline
    }

    /// The box fitter.
    #[must_use]
    pub const fn fitter(&self) -> &BoxFitter {
        &self.fitter
    }

    /// Cross-frame acquisition memory.
    #[must_use]
    pub const fn state(&self) -> &ContactState {
        &self.state
    }

    /// Cross-frame orientation memory.
    #[must_use]
    pub const fn stabilizer(&self) -> &OrientationStabilizer {
        &self.stabilizer
    }

    /// Processes one frame.
    ///
    /// Rejected and empty frames yield no footprint. The stabilizer keeps
    /// its memory across such frames.
    pub fn update(&mut self, ctx: &AcquisitionContext<'_>) -> PatchFrame {
        let acquisition = self.pipeline.acquire(ctx, &mut self.state);

        let center = match acquisition.geometric_center {
            Some(center) if acquisition.has_footprint() => center,
            _ => {
                return PatchFrame {
                    acquisition,
                    footprint: None,
                    fit: None,
                };
            }
        };

        let plane = Plane::new(acquisition.avg_contact_normal, center)
            .unwrap_or_else(|| self.pipeline.ground_plane().reanchored(&center));
        let local: Vec<Point2<f64>> = acquisition.positions().map(|p| plane.to_local(&p)).collect();
        let velocity = planar_velocity(&plane, ctx);

        let config = *self.fitter.config();
        let Some(outcome) = self.fitter.fit(&local, velocity) else {
            return PatchFrame {
                acquisition,
                footprint: None,
                fit: None,
            };
        };
        let fit = self.stabilizer.stabilize(&local, &outcome, velocity, config.min_size);
        let footprint = OrientedBox3D::from_box2d(&fit.bbox, &plane, config.depth);

        debug!(
            width = footprint.width,
            height = footprint.height,
            theta = footprint.theta,
            locked = fit.locked,
            "Fitted contact footprint"
        );

        PatchFrame {
            acquisition,
            footprint: Some(footprint),
            fit: Some(fit),
        }
    }

    /// Forgets all cross-frame memory.
    pub fn reset(&mut self) {
        self.state.reset();
        self.stabilizer.reset();
    }
}

/// The body's linear velocity in the plane's local frame.
fn planar_velocity(plane: &Plane, ctx: &AcquisitionContext<'_>) -> Vector2<f64> {
    let v = plane.to_local_vector(&ctx.body.linear_velocity());
    if v.iter().all(|c| c.is_finite()) {
        v
    } else {
        Vector2::zeros()
    }
}
