//! Integer cell coordinates for the planar hash grid.

/// A discrete cell coordinate on the (x, z) plane.
///
/// Uses `i64` so that fine cell sizes over large worlds do not overflow,
/// and supports negative indices so the grid can extend in every direction.
///
/// # Example
///
/// ```
/// use patch_types::CellCoord;
///
/// let cell = CellCoord::from_xz(0.015, -0.001, 1.0 / 0.01);
/// assert_eq!(cell, CellCoord::new(1, -1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    /// Cell index along world X.
    pub x: i64,
    /// Cell index along world Z.
    pub z: i64,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Quantizes a planar position into its containing cell.
    ///
    /// `inv_cell_size` is `1 / cell_size`; callers keep it precomputed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_xz(x: f64, z: f64, inv_cell_size: f64) -> Self {
        // Truncation is intentional: continuous coords map to discrete cells
        Self::new(
            (x * inv_cell_size).floor() as i64,
            (z * inv_cell_size).floor() as i64,
        )
    }

    /// Returns this cell and its 8 surrounding cells (3×3 block).
    ///
    /// # Example
    ///
    /// ```
    /// use patch_types::CellCoord;
    ///
    /// let block = CellCoord::new(0, 0).block3x3();
    /// assert_eq!(block.len(), 9);
    /// assert!(block.contains(&CellCoord::new(-1, 1)));
    /// ```
    #[must_use]
    pub fn block3x3(self) -> [Self; 9] {
        let mut result = [self; 9];
        let mut idx = 0;
        for dx in -1i64..=1 {
            for dz in -1i64..=1 {
                result[idx] = Self::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz));
                idx += 1;
            }
        }
        result
    }
}

impl From<(i64, i64)> for CellCoord {
    fn from((x, z): (i64, i64)) -> Self {
        Self::new(x, z)
    }
}
