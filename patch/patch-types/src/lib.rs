//! Geometry primitives for contact patch tracking.
//!
//! This crate provides the small, allocation-light building blocks shared by
//! the acquisition and fitting crates:
//!
//! - [`Plane`] - Unit normal + anchor, signed distance, projection and a
//!   Gram-Schmidt tangent frame for expressing points in 2D
//! - [`SpatialGrid`] - Uniform hash grid over (x, z) with radius queries
//! - [`CellCoord`] - Integer cell coordinates for the grid
//! - [`BoundingBox2D`] - Oriented rectangle in a plane's local frame
//! - [`OrientedBox3D`] - The same rectangle lifted into world space
//! - [`wrap_angle`], [`angle_difference`] - Orientation helpers
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Physics engine adapters
//! - Headless replay and analysis tools
//! - Web applications (WASM)
//!
//! # Coordinate System
//!
//! The ground plane is horizontal with normal `+Y`. Planar quantities
//! (grid cells, footprint orientation) live in the (x, z) plane, and the
//! default tangent frame maps local `(u, v)` to world `(x, z)`.
//!
//! # Example
//!
//! ```
//! use patch_types::{Plane, SpatialGrid};
//! use nalgebra::{Point2, Point3};
//!
//! let ground = Plane::ground(0.0);
//! let p = Point3::new(0.1, 0.002, 0.3);
//! assert!((ground.signed_distance(&p) - 0.002).abs() < 1e-12);
//!
//! let mut grid = SpatialGrid::new(0.01);
//! let a = grid.insert(Point2::new(0.0, 0.0));
//! grid.insert(Point2::new(0.005, 0.0));
//! assert_eq!(grid.neighbors_of(a, 0.01).len(), 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod angle;
mod boxes;
mod cell;
mod error;
mod grid;
mod plane;

// Re-export core types
pub use angle::{angle_difference, axis_angle_distance, wrap_angle};
pub use boxes::{BoundingBox2D, OrientedBox3D};
pub use cell::CellCoord;
pub use error::{GeometryError, GeometryResult};
pub use grid::SpatialGrid;
pub use plane::{NORMALIZE_EPSILON, Plane, safe_normalize};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
