//! Oriented footprint fitting for contact patches.
//!
//! This crate turns a planar point set into an oriented rectangle and keeps
//! that rectangle's orientation steady from frame to frame.
//!
//! # Features
//!
//! - **Convex hull**: Andrew's monotone chain, counter-clockwise output
//! - **Fitters**: AABB, PCA, minimum-area (rotating calipers), k-DOP and a
//!   k-DOP with local refinement
//! - **Velocity override**: fast bodies align their footprint with the heading
//! - **Stabilization**: freeze a velocity-aligned box whose orientation jumps
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Physics engine adapters
//! - Headless replay and analysis tools
//! - Web applications (WASM)
//!
//! # Example
//!
//! ```
//! use patch_fit::{BoxFitter, FitAlgorithm, FitConfig, OrientationStabilizer};
//! use nalgebra::{Point2, Vector2};
//!
//! let config = FitConfig::default().with_algorithm(FitAlgorithm::Ombb);
//! let fitter = BoxFitter::try_new(config).unwrap();
//! let mut stabilizer = OrientationStabilizer::from_config(fitter.config());
//!
//! // A 0.2 x 0.1 rectangle rotated by 30°
//! let (s, c) = 30f64.to_radians().sin_cos();
//! let pts: Vec<Point2<f64>> = [(0.0, 0.0), (0.2, 0.0), (0.2, 0.1), (0.0, 0.1)]
//!     .iter()
//!     .map(|&(x, y)| Point2::new(x * c - y * s, x * s + y * c))
//!     .collect();
//!
//! let outcome = fitter.fit(&pts, Vector2::zeros()).unwrap();
//! assert!((outcome.bbox.area() - 0.02).abs() < 1e-9);
//!
//! let fit = stabilizer.stabilize(&pts, &outcome, Vector2::zeros(), config.min_size);
//! assert!(!fit.locked);
//! ```
//!
//! # Coordinate System
//!
//! Points are expressed in a plane's local `(u, v)` frame; `theta` is the
//! angle of the box's width axis from `+u`, wrapped to `(-π, π]`.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod fitter;
mod hull;
mod obb;
mod stabilizer;

// Re-export main types and functions
pub use config::{FitAlgorithm, FitConfig};
pub use error::{FitError, FitResult};
pub use fitter::{BoxFitter, FitOutcome, OrientationSource};
pub use hull::{convex_hull, cross};
pub use obb::{fit_aabb, fit_hybrid, fit_kdop, fit_ombb, fit_pca, project_at};
pub use stabilizer::{OrientationStabilizer, StabilizedFit};

// Re-export shared geometry for convenience
pub use nalgebra::{Point2, Vector2};
pub use patch_types::BoundingBox2D;
