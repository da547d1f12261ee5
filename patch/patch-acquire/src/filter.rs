//! Noise control over the candidate set.
//!
//! Each filter takes the surviving points and returns the ones it keeps, in
//! their original order.

// Point counts stay far below 2^52.
#![allow(clippy::cast_precision_loss)]

use hashbrown::HashSet;
use nalgebra::{Point2, Point3};
use patch_types::{CellCoord, Plane, SpatialGrid};

/// IQR rejection needs at least this many points to estimate quartiles.
pub(crate) const IQR_MIN_POINTS: usize = 8;

/// Floor for the interquartile range (m).
const IQR_FLOOR: f64 = 1e-6;

/// Tukey fence multiplier.
const IQR_FENCE: f64 = 1.5;

/// Neighbor filtering is discarded when fewer points than this would survive.
const NEIGHBOR_MIN_SURVIVORS: usize = 3;

fn xz(p: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x, p.z)
}

/// Keeps the first point per (x, z) grid cell and drops points within
/// `min_pair_distance` of an already kept point.
///
/// A non-positive `cell_size` or `min_pair_distance` disables that half.
pub(crate) fn grid_dedup(points: &[Point3<f64>], cell_size: f64, min_pair_distance: f64) -> Vec<Point3<f64>> {
    let use_cells = cell_size > 0.0;
    let use_pairs = min_pair_distance > 0.0;
    let inv_cell = if use_cells { 1.0 / cell_size } else { 0.0 };

    let mut occupied: HashSet<CellCoord> = HashSet::with_capacity(points.len());
    let mut kept_grid = SpatialGrid::new(min_pair_distance);
    let mut kept = Vec::with_capacity(points.len());

    for p in points {
        let planar = xz(p);
        if use_cells && !occupied.insert(CellCoord::from_xz(p.x, p.z, inv_cell)) {
            continue;
        }
        if use_pairs && kept_grid.has_neighbor_within(planar, min_pair_distance) {
            continue;
        }
        kept_grid.insert(planar);
        kept.push(*p);
    }
    kept
}

/// Linear-interpolated percentile of an ascending slice, `q` in `[0, 1]`.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Drops points whose signed distance lies outside the Tukey fences
/// `[q25 - 1.5·iqr, q75 + 1.5·iqr]`.
///
/// Sets smaller than [`IQR_MIN_POINTS`] are returned unchanged.
pub(crate) fn reject_outliers(points: &[Point3<f64>], plane: &Plane) -> Vec<Point3<f64>> {
    if points.len() < IQR_MIN_POINTS {
        return points.to_vec();
    }
    let distances: Vec<f64> = points.iter().map(|p| plane.signed_distance(p)).collect();
    let mut sorted = distances.clone();
    sorted.sort_by(f64::total_cmp);

    let (Some(q25), Some(q75)) = (percentile(&sorted, 0.25), percentile(&sorted, 0.75)) else {
        return points.to_vec();
    };
    let iqr = (q75 - q25).max(IQR_FLOOR);
    let lo = q25 - IQR_FENCE * iqr;
    let hi = q75 + IQR_FENCE * iqr;

    points
        .iter()
        .zip(&distances)
        .filter(|&(_, d)| (lo..=hi).contains(d))
        .map(|(p, _)| *p)
        .collect()
}

/// Drops points with fewer than `min_neighbors` others within `radius`.
///
/// Returns `None` when the filter would leave fewer than three points, in
/// which case the caller keeps the unfiltered set.
pub(crate) fn neighbor_support(
    points: &[Point3<f64>],
    radius: f64,
    min_neighbors: usize,
) -> Option<Vec<Point3<f64>>> {
    let planar: Vec<Point2<f64>> = points.iter().map(xz).collect();
    let grid = SpatialGrid::from_points(radius, &planar);

    let kept: Vec<Point3<f64>> = points
        .iter()
        .enumerate()
        .filter(|&(i, _)| grid.neighbors_of(i, radius).len() >= min_neighbors)
        .map(|(_, p)| *p)
        .collect();

    (kept.len() >= NEIGHBOR_MIN_SURVIVORS).then_some(kept)
}

/// Uniform stride subsampling down to `target` points.
pub(crate) fn subsample(points: &[Point3<f64>], target: usize) -> Vec<Point3<f64>> {
    if points.len() <= target || target == 0 {
        return points.to_vec();
    }
    let step = points.len() as f64 / target as f64;
    (0..target)
        .map(|i| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = (i as f64 * step).floor() as usize;
            points[index.min(points.len() - 1)]
        })
        .collect()
}
