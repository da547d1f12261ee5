//! Uniform hash grid over the (x, z) plane.

use hashbrown::HashMap;
use nalgebra::Point2;

use crate::cell::CellCoord;
use crate::error::GeometryError;

/// Uniform spatial hash over planar (x, z) coordinates.
///
/// Points are stored under the cell `floor(x / cell_size), floor(z / cell_size)`
/// and addressed by the handle returned from [`SpatialGrid::insert`].
/// Radius queries scan the 3×3 block of cells around the query point, so they
/// are exact only when `radius <= cell_size`. Grids are meant to be built and
/// dropped within a single frame.
///
/// # Example
///
/// ```
/// use patch_types::SpatialGrid;
/// use nalgebra::Point2;
///
/// let mut grid = SpatialGrid::new(0.02);
/// let a = grid.insert(Point2::new(0.0, 0.0));
/// let b = grid.insert(Point2::new(0.01, 0.0));
/// let _far = grid.insert(Point2::new(1.0, 1.0));
///
/// assert_eq!(grid.neighbors_of(a, 0.02), vec![b]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Edge length of a cell in world units.
    cell_size: f64,
    /// Inverse of cell size for faster quantization.
    inv_cell_size: f64,
    /// Inserted points, indexed by handle.
    points: Vec<Point2<f64>>,
    /// Handles bucketed by cell.
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl SpatialGrid {
    /// Creates an empty grid.
    ///
    /// The cell size is made positive and clamped to at least `f64::EPSILON`.
    /// Use [`SpatialGrid::try_new`] to reject invalid sizes instead.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.abs().max(f64::EPSILON)
        } else {
            f64::EPSILON
        };
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            points: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Attempts to create a grid, returning an error if the cell size is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidCellSize`] if `cell_size` is not positive or finite.
    ///
    /// # Example
    ///
    /// ```
    /// use patch_types::{GeometryError, SpatialGrid};
    ///
    /// assert!(SpatialGrid::try_new(0.01).is_ok());
    /// assert!(matches!(
    ///     SpatialGrid::try_new(0.0),
    ///     Err(GeometryError::InvalidCellSize(_))
    /// ));
    /// ```
    pub fn try_new(cell_size: f64) -> Result<Self, GeometryError> {
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(GeometryError::InvalidCellSize(cell_size));
        }
        Ok(Self::new(cell_size))
    }

    /// Builds a grid containing every point of `points`, in order.
    ///
    /// Handle `i` refers to `points[i]`.
    #[must_use]
    pub fn from_points(cell_size: f64, points: &[Point2<f64>]) -> Self {
        let mut grid = Self::new(cell_size);
        grid.points.reserve(points.len());
        for &p in points {
            grid.insert(p);
        }
        grid
    }

    /// Returns the cell size.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Returns the number of inserted points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no points have been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the cell containing a point.
    #[must_use]
    pub fn cell_of(&self, point: Point2<f64>) -> CellCoord {
        CellCoord::from_xz(point.x, point.y, self.inv_cell_size)
    }

    /// Inserts a point and returns its handle.
    pub fn insert(&mut self, point: Point2<f64>) -> usize {
        let handle = self.points.len();
        self.points.push(point);
        let cell = self.cell_of(point);
        self.cells.entry(cell).or_default().push(handle);
        handle
    }

    /// Returns the point stored under a handle.
    #[must_use]
    pub fn point(&self, handle: usize) -> Option<Point2<f64>> {
        self.points.get(handle).copied()
    }

    /// Returns handles of all points within `radius` of `point`, including
    /// any point located exactly at `point`.
    ///
    /// No ordering guarantee.
    #[must_use]
    pub fn query(&self, point: Point2<f64>, radius: f64) -> Vec<usize> {
        self.collect_within(point, radius, None)
    }

    /// Returns handles of all points within `radius` of the point stored under
    /// `handle`, excluding that point itself.
    ///
    /// Coincident points inserted separately are still reported: exclusion is
    /// by identity, not by position. An unknown handle yields no neighbors.
    #[must_use]
    pub fn neighbors_of(&self, handle: usize, radius: f64) -> Vec<usize> {
        match self.point(handle) {
            Some(p) => self.collect_within(p, radius, Some(handle)),
            None => Vec::new(),
        }
    }

    /// Returns true if any inserted point lies within `radius` of `point`.
    #[must_use]
    pub fn has_neighbor_within(&self, point: Point2<f64>, radius: f64) -> bool {
        let r2 = radius * radius;
        self.cell_of(point).block3x3().iter().any(|cell| {
            self.cells.get(cell).is_some_and(|bucket| {
                bucket
                    .iter()
                    .any(|&h| (self.points[h] - point).norm_squared() <= r2)
            })
        })
    }

    /// Removes every point, keeping the cell size.
    pub fn clear(&mut self) {
        self.points.clear();
        self.cells.clear();
    }

    fn collect_within(&self, point: Point2<f64>, radius: f64, skip: Option<usize>) -> Vec<usize> {
        let r2 = radius * radius;
        let mut found = Vec::new();
        for cell in self.cell_of(point).block3x3() {
            let Some(bucket) = self.cells.get(&cell) else {
                continue;
            };
            for &h in bucket {
                if Some(h) == skip {
                    continue;
                }
                if (self.points[h] - point).norm_squared() <= r2 {
                    found.push(h);
                }
            }
        }
        found
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_cell_size() {
        assert!(SpatialGrid::new(-0.5).cell_size() > 0.0);
        assert!(SpatialGrid::new(f64::NAN).cell_size() > 0.0);
        assert_eq!(SpatialGrid::new(0.25).cell_size(), 0.25);
    }

    #[test]
    fn test_try_new_rejects_invalid() {
        assert!(SpatialGrid::try_new(-1.0).is_err());
        assert!(SpatialGrid::try_new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_insert_and_len() {
        let mut grid = SpatialGrid::new(0.1);
        assert!(grid.is_empty());
        let h = grid.insert(Point2::new(0.3, -0.2));
        assert_eq!(h, 0);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.point(0), Some(Point2::new(0.3, -0.2)));
        assert_eq!(grid.point(7), None);
    }

    #[test]
    fn test_neighbors_excludes_self() {
        let grid = SpatialGrid::from_points(
            0.1,
            &[Point2::new(0.0, 0.0), Point2::new(0.05, 0.05), Point2::new(0.5, 0.5)],
        );
        let mut n = grid.neighbors_of(0, 0.1);
        n.sort_unstable();
        assert_eq!(n, vec![1]);
        assert!(grid.neighbors_of(2, 0.1).is_empty());
    }

    #[test]
    fn test_coincident_points_are_neighbors() {
        let grid = SpatialGrid::from_points(0.1, &[Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)]);
        assert_eq!(grid.neighbors_of(0, 0.1), vec![1]);
        assert_eq!(grid.neighbors_of(1, 0.1), vec![0]);
    }

    #[test]
    fn test_query_crosses_cell_boundary() {
        // Points on either side of the x = 0 cell boundary
        let grid = SpatialGrid::from_points(0.1, &[Point2::new(-0.01, 0.0), Point2::new(0.01, 0.0)]);
        let mut found = grid.query(Point2::new(0.0, 0.0), 0.1);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_radius_is_respected() {
        let grid = SpatialGrid::from_points(0.1, &[Point2::new(0.0, 0.0), Point2::new(0.09, 0.09)]);
        // Distance is ~0.127, outside the 0.1 radius even though in the 3x3 block
        assert!(grid.neighbors_of(0, 0.1).is_empty());
        assert!(grid.has_neighbor_within(Point2::new(0.05, 0.05), 0.1));
        assert!(!grid.has_neighbor_within(Point2::new(1.0, 1.0), 0.1));
    }

    #[test]
    fn test_clear() {
        let mut grid = SpatialGrid::from_points(0.1, &[Point2::new(0.0, 0.0)]);
        grid.clear();
        assert!(grid.is_empty());
        assert!(grid.query(Point2::new(0.0, 0.0), 0.1).is_empty());
    }
}
