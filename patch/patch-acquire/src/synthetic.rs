//! Synthetic contact points from the body's mesh silhouette.
//!
//! When only a handful of real contacts survive, the footprint is
//! under-determined. The mesh vertices lying close to the contact plane
//! outline the region that is about to touch or just touched; the corners of
//! their tightest rectangle stand in for the missing contacts.

use hashbrown::HashSet;
use nalgebra::{Point2, Point3, center};
use patch_fit::fit_kdop;
use patch_types::{CellCoord, Plane};
use tracing::trace;

/// Upper bound on mesh vertices examined per frame.
pub(crate) const MAX_MESH_SAMPLES: usize = 500;

/// Silhouette points are deduplicated on a grid of this size (m).
const SILHOUETTE_CELL: f64 = 0.01;

/// Orientations tested for the silhouette rectangle.
const SILHOUETTE_ORIENTATIONS: usize = 8;

/// Synthesized points plus the number of mesh vertices examined.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Augmentation {
    pub(crate) points: Vec<Point3<f64>>,
    pub(crate) mesh_samples: usize,
}

/// Builds synthetic contacts from the vertices within `band` of `plane`.
///
/// Emits the four corners of the silhouette's k-DOP rectangle, mapped back
/// onto the plane, plus the four edge midpoints when `spinning`.
pub(crate) fn augment(mesh: &[Point3<f64>], plane: &Plane, band: f64, spinning: bool) -> Augmentation {
    let stride = mesh.len().div_ceil(MAX_MESH_SAMPLES).max(1);
    let mut cells: HashSet<CellCoord> = HashSet::new();
    let mut silhouette: Vec<Point2<f64>> = Vec::new();
    let mut mesh_samples = 0;

    for v in mesh.iter().step_by(stride).take(MAX_MESH_SAMPLES) {
        mesh_samples += 1;
        let d = plane.signed_distance(v);
        if !d.is_finite() || d.abs() > band {
            continue;
        }
        let local = plane.to_local(v);
        if cells.insert(CellCoord::from_xz(local.x, local.y, 1.0 / SILHOUETTE_CELL)) {
            silhouette.push(local);
        }
    }

    let Some(rect) = fit_kdop(&silhouette, SILHOUETTE_ORIENTATIONS, 0.0) else {
        return Augmentation {
            points: Vec::new(),
            mesh_samples,
        };
    };

    let corners = rect.corners();
    let mut points: Vec<Point3<f64>> = corners.iter().map(|c| plane.from_local(c)).collect();
    if spinning {
        for i in 0..corners.len() {
            let a = corners[i];
            let b = corners[(i + 1) % corners.len()];
            points.push(plane.from_local(&center(&a, &b)));
        }
    }

    trace!(
        mesh_samples,
        silhouette = silhouette.len(),
        emitted = points.len(),
        "Synthesized silhouette contacts"
    );
    Augmentation {
        points,
        mesh_samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Vertices of a box footprint `[0, w] x [0, d]` at heights 0 and `h`.
    fn box_mesh(w: f64, d: f64, h: f64, steps: u32) -> Vec<Point3<f64>> {
        let mut out = Vec::new();
        for i in 0..=steps {
            for j in 0..=steps {
                let x = w * f64::from(i) / f64::from(steps);
                let z = d * f64::from(j) / f64::from(steps);
                out.push(Point3::new(x, 0.0, z));
                out.push(Point3::new(x, h, z));
            }
        }
        out
    }

    #[test]
    fn test_corners_of_footprint() {
        let mesh = box_mesh(0.2, 0.1, 0.3, 4);
        let aug = augment(&mesh, &Plane::ground(0.0), 0.02, false);
        assert_eq!(aug.points.len(), 4);
        assert_eq!(aug.mesh_samples, mesh.len());

        let min_x = aug.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = aug.points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_z = aug.points.iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(min_x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(max_x, 0.2, epsilon = 1e-9);
        assert_relative_eq!(max_z, 0.1, epsilon = 1e-9);
        assert!(aug.points.iter().all(|p| p.y.abs() < 1e-12));
    }

    #[test]
    fn test_spin_adds_midpoints() {
        let mesh = box_mesh(0.2, 0.1, 0.3, 4);
        let aug = augment(&mesh, &Plane::ground(0.0), 0.02, true);
        assert_eq!(aug.points.len(), 8);
    }

    #[test]
    fn test_large_mesh_is_subsampled() {
        let mesh = box_mesh(0.2, 0.1, 0.3, 40);
        assert!(mesh.len() > MAX_MESH_SAMPLES);
        let aug = augment(&mesh, &Plane::ground(0.0), 0.02, false);
        assert!(aug.mesh_samples <= MAX_MESH_SAMPLES);
        assert_eq!(aug.points.len(), 4);
    }

    #[test]
    fn test_nothing_near_plane() {
        let mesh = box_mesh(0.2, 0.1, 0.3, 4);
        let aug = augment(&mesh, &Plane::ground(-1.0), 0.02, false);
        assert!(aug.points.is_empty());
    }
}
