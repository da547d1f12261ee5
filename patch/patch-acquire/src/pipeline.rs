//! The five-phase acquisition pipeline.

use patch_types::Plane;
use tracing::{debug, trace};

use crate::acquire::gather_candidates;
use crate::error::AcquireResult;
use crate::estimate::{average_raw, centroid, smooth};
use crate::filter::{grid_dedup, neighbor_support, reject_outliers, subsample};
use crate::params::ContactParams;
use crate::quality::{assess, resolve_hold, vertical_spread};
use crate::result::{AcquisitionDiagnostics, AcquisitionResult, ContactSample};
use crate::source::{AcquisitionContext, BodyType};
use crate::state::{ContactState, GoodFrame};
use crate::synthetic::augment;

/// Turns one frame of raw contacts into a filtered, quality-flagged point set.
///
/// Phases, in order:
///
/// 1. Gather candidates from manifolds (and, for soft bodies, nodes).
/// 2. Deduplicate, reject outliers, drop unsupported points, subsample.
/// 3. Average the raw contacts and center the filtered set, with smoothing.
/// 4. Flag the frame and substitute the last good frame when rejected.
/// 5. Add silhouette corners when real contacts are sparse.
///
/// The pipeline holds only configuration; all memory lives in the
/// [`ContactState`] passed to [`ContactAcquisitionPipeline::acquire`].
///
/// # Example
///
/// ```
/// use patch_acquire::{
///     AcquisitionContext, BodyMotion, ContactAcquisitionPipeline, ContactManifold,
///     ContactState, ManifoldContact, ManifoldSet,
/// };
/// use nalgebra::{Point3, Vector3};
///
/// let pipeline = ContactAcquisitionPipeline::rigid();
/// let mut state = ContactState::new();
///
/// let manifolds: ManifoldSet = [ContactManifold::new(
///     [(0.0, 0.0), (0.1, 0.0), (0.1, 0.05), (0.0, 0.05)]
///         .iter()
///         .map(|&(x, z)| ManifoldContact::new(Point3::new(x, 0.0, z), Vector3::y(), 0.0))
///         .collect(),
/// )]
/// .into_iter()
/// .collect();
/// let body = BodyMotion::at_rest();
///
/// let result = pipeline.acquire(&AcquisitionContext::rigid(0.0, &manifolds, &body), &mut state);
/// assert_eq!(result.filtered_count, 4);
/// assert!(result.has_footprint());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactAcquisitionPipeline {
    params: ContactParams,
}

impl ContactAcquisitionPipeline {
    /// Creates a pipeline, repairing invalid parameters.
    ///
    /// See [`ContactParams::sanitized`].
    #[must_use]
    pub fn new(params: ContactParams) -> Self {
        Self {
            params: params.sanitized(),
        }
    }

    /// Creates a pipeline, rejecting invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`ContactParams::validate`].
    pub fn try_new(params: ContactParams) -> AcquireResult<Self> {
        params.validate()?;
        Ok(Self::new(params))
    }

    /// Pipeline with the rigid-body preset.
    #[must_use]
    pub fn rigid() -> Self {
        Self::new(ContactParams::rigid_default())
    }

    /// Pipeline with the soft-body preset.
    #[must_use]
    pub fn soft() -> Self {
        Self::new(ContactParams::soft_body())
    }

    /// The (sanitized) parameters.
    #[must_use]
    pub const fn params(&self) -> &ContactParams {
        &self.params
    }

    /// The configured ground plane.
    #[must_use]
    pub fn ground_plane(&self) -> Plane {
        self.params
            .ground_plane()
            .unwrap_or_else(|| Plane::ground(self.params.ground_offset))
    }

    /// Processes one frame.
    ///
    /// Never fails: missing inputs, degenerate planes and empty frames are
    /// reported through the result's flags and `Option` fields.
    pub fn acquire(&self, ctx: &AcquisitionContext<'_>, state: &mut ContactState) -> AcquisitionResult {
        let params = &self.params;
        let mut diagnostics = AcquisitionDiagnostics {
            dt: state.advance_clock(ctx.timestamp),
            ..AcquisitionDiagnostics::default()
        };

        let plane = ctx.contact_plane.or_else(|| params.ground_plane());
        diagnostics.plane_available = plane.is_some();
        let reference_normal = plane.map_or(params.ground_normal, |p| p.normal());

        // Phase 1: candidates
        let candidates = gather_candidates(
            params,
            ctx.body_type,
            ctx.manifolds,
            ctx.nodes,
            plane.as_ref(),
            state,
            &mut diagnostics,
        );
        let raw_count = candidates.len();

        // Phase 2: noise control
        let mut filtered: Vec<_> = candidates.iter().map(|c| c.position).collect();
        if params.use_grid_dedup {
            let before = filtered.len();
            filtered = grid_dedup(&filtered, params.grid_cell_xz, params.min_pair_distance);
            diagnostics.removed_by_dedup = before - filtered.len();
        }
        if params.use_iqr_rejection {
            if let Some(plane) = &plane {
                let before = filtered.len();
                filtered = reject_outliers(&filtered, plane);
                diagnostics.removed_by_iqr = before - filtered.len();
            }
        }
        if params.use_neighbor_filter && ctx.body_type == BodyType::Soft {
            if let Some(kept) = neighbor_support(&filtered, params.neighbor_radius, params.min_neighbors) {
                diagnostics.removed_by_neighbors = filtered.len() - kept.len();
                filtered = kept;
            }
        }
        if filtered.len() > params.target_contacts {
            let before = filtered.len();
            filtered = subsample(&filtered, params.target_contacts);
            diagnostics.removed_by_subsample = before - filtered.len();
        }
        trace!(
            raw = raw_count,
            dedup = diagnostics.removed_by_dedup,
            iqr = diagnostics.removed_by_iqr,
            neighbors = diagnostics.removed_by_neighbors,
            subsample = diagnostics.removed_by_subsample,
            "Filtered contact candidates"
        );

        // Phase 3: centroid and normal
        let (avg_contact_point, avg_normal) = average_raw(&candidates, &reference_normal);
        let mut center = centroid(&filtered);
        if params.use_ema {
            if let (Some(current), Some(previous)) = (center, state.prev_centroid) {
                let (smoothed, alpha) = smooth(current, previous, diagnostics.dt, params.ema_time_constant);
                center = Some(smoothed);
                diagnostics.ema_alpha = alpha;
            }
        }

        // Phase 4: quality gates and hold-last
        let filtered_count = filtered.len();
        diagnostics.vertical_spread = plane.as_ref().and_then(|p| vertical_spread(&filtered, p));
        let mut flags = assess(params, filtered_count, diagnostics.vertical_spread, plane.is_some());
        let current = center.map(|centroid| GoodFrame {
            points: filtered,
            centroid,
            normal: avg_normal,
        });
        let (points, geometric_center, avg_contact_normal) =
            match resolve_hold(params, state, &mut flags, current) {
                Some(frame) => (frame.points, Some(frame.centroid), frame.normal),
                None => (Vec::new(), None, avg_normal),
            };
        state.prev_centroid = geometric_center;
        state.prev_flags = Some(flags.clone());

        // Phase 5: synthetic augmentation
        let mut samples: Vec<ContactSample> = points.iter().copied().map(ContactSample::real).collect();
        let real_count = samples.len();
        if params.use_synthetic_augmentation && real_count > 0 && real_count <= params.synthetic_threshold {
            if let (Some(mesh), Some(center)) = (ctx.mesh_vertices, geometric_center) {
                let contact_plane = Plane::new(avg_contact_normal, center)
                    .unwrap_or_else(|| self.ground_plane().reanchored(&center));
                let spinning = ctx.body.angular_velocity().norm() > params.spin_threshold;
                let augmentation = augment(mesh, &contact_plane, params.synthetic_band, spinning);
                diagnostics.mesh_samples = augmentation.mesh_samples;
                samples.extend(augmentation.points.into_iter().map(ContactSample::synthetic));
            }
        }
        let synthetic_count = samples.len() - real_count;

        debug!(
            raw = raw_count,
            filtered = filtered_count,
            real = real_count,
            synthetic = synthetic_count,
            degraded = flags.degraded,
            rejected = flags.rejected,
            held = flags.held,
            "Acquired contact frame"
        );

        AcquisitionResult {
            samples,
            raw_count,
            filtered_count,
            real_count,
            synthetic_count,
            avg_contact_normal,
            avg_contact_point,
            geometric_center,
            flags,
            diagnostics,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::QualityReason;
    use crate::source::{BodyMotion, ContactManifold, ManifoldContact, ManifoldSet};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn manifolds(points: &[(f64, f64, f64)]) -> ManifoldSet {
        [ContactManifold::new(
            points
                .iter()
                .map(|&(x, y, z)| ManifoldContact::new(Point3::new(x, y, z), Vector3::y(), 0.0))
                .collect(),
        )]
        .into_iter()
        .collect()
    }

    fn square(size: f64, offset_x: f64) -> Vec<(f64, f64, f64)> {
        let mut pts = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                pts.push((offset_x + size * f64::from(i) / 2.0, 0.0, size * f64::from(j) / 2.0));
            }
        }
        pts
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let pipeline = ContactAcquisitionPipeline::rigid();
        let mut state = ContactState::new();
        let body = BodyMotion::at_rest();
        let set = ManifoldSet::new();
        let result = pipeline.acquire(&AcquisitionContext::rigid(0.0, &set, &body), &mut state);
        assert_eq!(result.raw_count, 0);
        assert!(result.flags.rejected);
        assert_eq!(result.flags.reasons, vec![QualityReason::NoContacts]);
        assert!(!result.has_footprint());
        assert_eq!(result.avg_contact_normal, Vector3::y());
    }

    #[test]
    fn test_counts_are_consistent() {
        let pipeline = ContactAcquisitionPipeline::rigid();
        let mut state = ContactState::new();
        let body = BodyMotion::at_rest();
        let set = manifolds(&square(0.1, 0.0));
        let result = pipeline.acquire(&AcquisitionContext::rigid(0.0, &set, &body), &mut state);
        assert_eq!(result.raw_count, 9);
        assert_eq!(result.filtered_count, 9);
        assert!(result.filtered_count <= result.raw_count);
        assert_eq!(result.real_count + result.synthetic_count, result.count());
        assert_relative_eq!(result.geometric_center.unwrap(), Point3::new(0.05, 0.0, 0.05), epsilon = 1e-12);
        assert!(result.flags.is_clean());
    }

    #[test]
    fn test_ema_blends_centroid() {
        let pipeline = ContactAcquisitionPipeline::rigid();
        let mut state = ContactState::new();
        let body = BodyMotion::at_rest();

        let first = manifolds(&square(0.1, 0.0));
        pipeline.acquire(&AcquisitionContext::rigid(0.0, &first, &body), &mut state);

        let moved = manifolds(&square(0.1, 0.1));
        let result = pipeline.acquire(&AcquisitionContext::rigid(0.05, &moved, &body), &mut state);

        let alpha = result.diagnostics.ema_alpha.unwrap();
        assert_relative_eq!(alpha, (-1.0f64).exp(), epsilon = 1e-12);
        let expected_x = 0.05 * alpha + 0.15 * (1.0 - alpha);
        assert_relative_eq!(result.geometric_center.unwrap().x, expected_x, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_spread_rejects() {
        let pipeline = ContactAcquisitionPipeline::new(ContactParams::rigid_default().with_iqr_rejection(false));
        let mut state = ContactState::new();
        let body = BodyMotion::at_rest();
        let mut pts = square(0.1, 0.0);
        for (k, p) in pts.iter_mut().enumerate() {
            p.1 = if k % 2 == 0 { 0.0 } else { -0.03 };
        }
        let set = manifolds(&pts);
        let result = pipeline.acquire(&AcquisitionContext::rigid(0.0, &set, &body), &mut state);
        assert!(result.flags.rejected);
        assert!(result.diagnostics.vertical_spread.unwrap() > 0.008);
    }

    #[test]
    fn test_plane_always_available() {
        let params = ContactParams::rigid_default().with_ground(Vector3::zeros(), f64::NAN);
        let pipeline = ContactAcquisitionPipeline::new(params);
        let mut state = ContactState::new();
        let body = BodyMotion::at_rest();
        let set = manifolds(&square(0.1, 0.0));
        let result = pipeline.acquire(&AcquisitionContext::rigid(0.0, &set, &body), &mut state);
        assert!(result.diagnostics.plane_available);
        assert!(!result.flags.reasons.contains(&QualityReason::PlaneUnavailable));
        assert!(result.diagnostics.vertical_spread.is_some());
    }

    #[test]
    fn test_try_new_rejects_invalid() {
        assert!(ContactAcquisitionPipeline::try_new(ContactParams::default().with_hold_frames(1)).is_ok());
        assert!(ContactAcquisitionPipeline::try_new(ContactParams::default().with_max_separation(f64::NAN)).is_err());
        // new() repairs instead
        let pipeline = ContactAcquisitionPipeline::new(ContactParams::default().with_max_separation(f64::NAN));
        assert_relative_eq!(pipeline.params().max_separation, 0.010);
    }
}
