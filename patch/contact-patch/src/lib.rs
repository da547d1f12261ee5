//! Stable oriented contact footprints for simulated bodies.
//!
//! This umbrella crate re-exports the patch-* crates and ties them together
//! in [`ContactPatchTracker`], which turns one frame of physics-engine
//! contacts into an oriented box on the contact plane. All crates are
//! Layer 0 (zero Bevy dependencies).
//!
//! # Quick Start
//!
//! ```
//! use contact_patch::prelude::*;
//!
//! let mut tracker = ContactPatchTracker::soft();
//!
//! // A 4 x 3 grid of soft-body nodes pressed into the ground
//! let nodes = NodeSet::new(
//!     (0..12)
//!         .map(|i| {
//!             let p = Point3::new(f64::from(i % 4) * 0.015, 0.001, f64::from(i / 4) * 0.015);
//!             SoftNode::new(p, Vector3::zeros(), -Vector3::y())
//!         })
//!         .collect(),
//! );
//! let manifolds = ManifoldSet::new();
//! let body = BodyMotion::at_rest();
//!
//! let frame = tracker.update(&AcquisitionContext::soft(0.0, &manifolds, &nodes, &body));
//! assert!(frame.has_footprint());
//! assert_eq!(frame.acquisition.real_count, 12);
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Planes, spatial grid, boxes and angle helpers
//! - [`fit`] - Convex hull, box fitters and the orientation stabilizer
//! - [`acquire`] - Candidate gathering, noise filtering and quality gates
//!
//! # Feature Flags
//!
//! - `serde` - Serialize and deserialize configuration and results

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod tracker;

pub use tracker::{ContactPatchTracker, PatchFrame};

// =============================================================================
// Re-exports
// =============================================================================

/// Planes, spatial grid, boxes and angle helpers.
pub use patch_types as types;

/// Convex hull, box fitters and the orientation stabilizer.
pub use patch_fit as fit;

/// Candidate gathering, noise filtering and quality gates.
pub use patch_acquire as acquire;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for contact patch tracking.
///
/// # Usage
///
/// ```
/// use contact_patch::prelude::*;
/// ```
pub mod prelude {
    // Geometry
    pub use patch_types::{BoundingBox2D, OrientedBox3D, Plane, SpatialGrid};

    // Fitting
    pub use patch_fit::{BoxFitter, FitAlgorithm, FitConfig, OrientationStabilizer, StabilizedFit};

    // Acquisition
    pub use patch_acquire::{
        AcquisitionContext, AcquisitionResult, BodyMotion, BodyType, ContactAcquisitionPipeline,
        ContactManifold, ContactParams, ContactState, ManifoldContact, ManifoldSet, NodeSet,
        QualityFlags, QualityReason, SoftNode,
    };

    // Tracking
    pub use crate::{ContactPatchTracker, PatchFrame};

    // Math
    pub use nalgebra::{Point2, Point3, Vector2, Vector3};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let tracker = ContactPatchTracker::default();
        assert_eq!(tracker.fitter().config(), &FitConfig::default());
        assert_eq!(tracker.pipeline().params(), &ContactParams::rigid_default());
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::Plane::ground(0.0);
        let _ = fit::FitConfig::default();
        let _ = acquire::ContactParams::soft_body();
    }
}
