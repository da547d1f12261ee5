//! Acquisition output records.

use nalgebra::{Point3, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a contact sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Provenance {
    /// Reported by the physics engine.
    Real,
    /// Inferred from the body's mesh silhouette.
    Synthetic,
}

/// One emitted contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactSample {
    /// World position.
    pub position: Point3<f64>,
    /// Real or synthetic.
    pub provenance: Provenance,
}

impl ContactSample {
    /// A sample reported by the engine.
    #[must_use]
    pub const fn real(position: Point3<f64>) -> Self {
        Self {
            position,
            provenance: Provenance::Real,
        }
    }

    /// A sample inferred from the mesh.
    #[must_use]
    pub const fn synthetic(position: Point3<f64>) -> Self {
        Self {
            position,
            provenance: Provenance::Synthetic,
        }
    }

    /// Returns true for synthetic samples.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }
}

/// Why a frame was flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QualityReason {
    /// No contact survived filtering.
    NoContacts,
    /// Fewer contacts than the quality minimum.
    TooFewContacts {
        /// Filtered contact count.
        count: usize,
    },
    /// Signed distances spread more than allowed.
    VerticalSpread {
        /// Standard deviation of the signed distances (m).
        std_dev: f64,
    },
    /// No valid contact plane, so plane-based checks were skipped.
    ///
    /// [`ContactAcquisitionPipeline`](crate::ContactAcquisitionPipeline)
    /// always has a plane, either the caller's contact plane or the
    /// sanitized ground plane, so its results never carry this reason.
    PlaneUnavailable,
    /// The last good frame was reused.
    HeldLastGood {
        /// Consecutive held frames including this one.
        frame: usize,
    },
}

/// Quality verdict for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityFlags {
    /// Usable but sparse.
    pub degraded: bool,
    /// Not usable; the caller should draw no footprint.
    pub rejected: bool,
    /// The reported samples belong to an earlier good frame.
    pub held: bool,
    /// Every reason that contributed to the verdict.
    pub reasons: Vec<QualityReason>,
}

impl QualityFlags {
    /// True when nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.degraded && !self.rejected && !self.held
    }
}

/// Per-phase counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcquisitionDiagnostics {
    /// Candidates taken from manifolds.
    pub manifold_candidates: usize,
    /// Candidates taken from deformable nodes.
    pub node_candidates: usize,
    /// Manifold contacts dropped by the separation filter.
    pub removed_by_distance: usize,
    /// Candidates dropped because `max_candidates` was reached.
    pub removed_by_cap: usize,
    /// Points dropped by grid deduplication.
    pub removed_by_dedup: usize,
    /// Points dropped as signed-distance outliers.
    pub removed_by_iqr: usize,
    /// Points dropped for lack of neighbor support.
    pub removed_by_neighbors: usize,
    /// Points dropped by subsampling.
    pub removed_by_subsample: usize,
    /// Nodes that crossed from above the exit threshold to below the enter threshold.
    pub hysteresis_entries: usize,
    /// Nodes admitted only by the approach velocity gate.
    pub velocity_gated: usize,
    /// Time since the previous frame (s), zero on the first frame.
    pub dt: f64,
    /// Smoothing weight of the previous centroid, when smoothing ran.
    pub ema_alpha: Option<f64>,
    /// Standard deviation of filtered signed distances (m).
    pub vertical_spread: Option<f64>,
    /// Mesh vertices examined for synthetic points.
    pub mesh_samples: usize,
    /// Whether a contact plane was available.
    pub plane_available: bool,
}

/// Everything the pipeline reports for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcquisitionResult {
    /// Emitted samples, real ones first.
    pub samples: Vec<ContactSample>,
    /// Candidates gathered before filtering.
    pub raw_count: usize,
    /// Points surviving this frame's filters.
    ///
    /// For a held frame this is still the current frame's count, while
    /// `samples` holds the reused points.
    pub filtered_count: usize,
    /// Real samples emitted.
    pub real_count: usize,
    /// Synthetic samples emitted.
    pub synthetic_count: usize,
    /// Mean raw contact normal, oriented toward the ground normal.
    ///
    /// A held frame reports the normal of the reused frame.
    pub avg_contact_normal: Vector3<f64>,
    /// Mean raw contact position.
    pub avg_contact_point: Option<Point3<f64>>,
    /// Center of the filtered set, smoothed when enabled.
    pub geometric_center: Option<Point3<f64>>,
    /// Quality verdict.
    pub flags: QualityFlags,
    /// Per-phase counters.
    pub diagnostics: AcquisitionDiagnostics,
}

impl AcquisitionResult {
    /// Number of emitted samples.
    #[must_use]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// True when the caller should draw a footprint this frame.
    #[must_use]
    pub fn has_footprint(&self) -> bool {
        !self.flags.rejected && !self.samples.is_empty() && self.geometric_center.is_some()
    }

    /// Positions of all emitted samples.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.samples.iter().map(|s| s.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_provenance() {
        assert!(!ContactSample::real(Point3::origin()).is_synthetic());
        assert!(ContactSample::synthetic(Point3::origin()).is_synthetic());
    }

    #[test]
    fn test_empty_result_has_no_footprint() {
        let result = AcquisitionResult::default();
        assert_eq!(result.count(), 0);
        assert!(!result.has_footprint());
        assert!(result.flags.is_clean());
    }

    #[test]
    fn test_rejected_result_has_no_footprint() {
        let result = AcquisitionResult {
            samples: vec![ContactSample::real(Point3::origin())],
            geometric_center: Some(Point3::origin()),
            flags: QualityFlags {
                rejected: true,
                ..QualityFlags::default()
            },
            ..AcquisitionResult::default()
        };
        assert!(!result.has_footprint());
    }
}
