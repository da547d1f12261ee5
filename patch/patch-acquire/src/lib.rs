//! Per-frame contact acquisition for contact patch tracking.
//!
//! This crate turns the noisy, high-frequency contacts reported by a physics
//! engine into a trustworthy point set for footprint fitting:
//!
//! - **Acquisition**: manifold contacts, plus deformable nodes gated by a
//!   hysteresis band and an approach-velocity test
//! - **Noise control**: grid deduplication, IQR outlier rejection and
//!   neighbor-support filtering, each toggleable
//! - **Estimation**: mean contact normal and a frame-rate independent
//!   exponentially smoothed center
//! - **Quality gates**: degraded/rejected flags with hold-last substitution
//! - **Augmentation**: silhouette corners from the body mesh when real
//!   contacts are sparse, tagged as synthetic
//!
//! # Contact Model
//!
//! A deformable node at signed distance `d` above the ground is admitted when
//!
//! ```text
//! d ≤ d_enter  ∨  (d_prev > d_exit ∧ d ≤ d_enter)  ∨  v·n < -v_min
//! ```
//!
//! and the center is smoothed with `α = exp(-Δt / τ)`.
//!
//! # Example
//!
//! ```
//! use patch_acquire::{
//!     AcquisitionContext, BodyMotion, ContactAcquisitionPipeline, ContactState, NodeSet,
//!     ManifoldSet, SoftNode,
//! };
//! use nalgebra::{Point3, Vector3};
//!
//! let pipeline = ContactAcquisitionPipeline::soft();
//! let mut state = ContactState::new();
//!
//! // A 3 x 3 patch of nodes resting on the ground
//! let nodes = NodeSet::new(
//!     (0..9)
//!         .map(|i| {
//!             let (x, z) = (f64::from(i % 3) * 0.01, f64::from(i / 3) * 0.01);
//!             SoftNode::new(Point3::new(x, 0.002, z), Vector3::zeros(), -Vector3::y())
//!         })
//!         .collect(),
//! );
//! let manifolds = ManifoldSet::new();
//! let body = BodyMotion::at_rest();
//!
//! let ctx = AcquisitionContext::soft(0.0, &manifolds, &nodes, &body);
//! let result = pipeline.acquire(&ctx, &mut state);
//! assert_eq!(result.raw_count, 9);
//! assert!(result.has_footprint());
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//!
//! - Physics engine adapters
//! - Headless replay and analysis tools
//! - Other physics engines

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod acquire;
mod error;
mod estimate;
mod filter;
mod params;
mod pipeline;
mod quality;
mod result;
mod source;
mod state;
mod synthetic;

pub use error::{AcquireError, AcquireResult};
pub use params::ContactParams;
pub use pipeline::ContactAcquisitionPipeline;
pub use result::{
    AcquisitionDiagnostics, AcquisitionResult, ContactSample, Provenance, QualityFlags,
    QualityReason,
};
pub use source::{
    AcquisitionContext, BodyKinematics, BodyMotion, BodyType, ContactManifold, DeformableNodes,
    ManifoldContact, ManifoldSet, ManifoldSource, NodeSet, SoftNode,
};
pub use state::ContactState;

// Re-export types needed to build contexts
pub use nalgebra::{Point3, Vector3};
pub use patch_types::Plane;
