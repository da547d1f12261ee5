//! Cross-frame memory of the acquisition pipeline.

use nalgebra::{Point3, Vector3};

use crate::result::QualityFlags;

/// The filtered set of the most recent frame that passed the quality gates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GoodFrame {
    pub(crate) points: Vec<Point3<f64>>,
    pub(crate) centroid: Point3<f64>,
    pub(crate) normal: Vector3<f64>,
}

/// Per-body memory carried between pipeline calls.
///
/// One instance belongs to exactly one tracked body. Call
/// [`ContactState::reset`] when that body is replaced or teleported.
///
/// # Example
///
/// ```
/// use patch_acquire::ContactState;
///
/// let mut state = ContactState::new();
/// assert_eq!(state.held_frames(), 0);
/// assert!(state.last_update().is_none());
/// state.reset();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactState {
    /// Signed distance of each deformable node on the previous frame.
    pub(crate) node_distances: Vec<Option<f64>>,
    /// Geometric center reported on the previous frame.
    pub(crate) prev_centroid: Option<Point3<f64>>,
    /// Most recent frame that was not rejected.
    pub(crate) last_good: Option<GoodFrame>,
    /// Flags reported on the previous frame.
    pub(crate) prev_flags: Option<QualityFlags>,
    /// Consecutive frames served from `last_good`.
    pub(crate) held_frames: usize,
    pub(crate) prev_dt: f64,
    pub(crate) dt: f64,
    pub(crate) last_update: Option<f64>,
}

impl ContactState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything learned from previous frames.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Consecutive frames that reused the last good frame.
    #[must_use]
    pub const fn held_frames(&self) -> usize {
        self.held_frames
    }

    /// Timestamp of the previous call.
    #[must_use]
    pub const fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    /// Frame time reported by the call before the last one.
    #[must_use]
    pub const fn previous_dt(&self) -> f64 {
        self.prev_dt
    }

    /// Time between the last call and the one before it.
    ///
    /// Zero after the first call.
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Geometric center reported on the previous frame.
    #[must_use]
    pub const fn previous_centroid(&self) -> Option<Point3<f64>> {
        self.prev_centroid
    }

    /// Centroid of the last frame that passed the quality gates.
    #[must_use]
    pub fn last_good_centroid(&self) -> Option<Point3<f64>> {
        self.last_good.as_ref().map(|g| g.centroid)
    }

    /// Flags reported on the previous frame.
    #[must_use]
    pub const fn previous_flags(&self) -> Option<&QualityFlags> {
        self.prev_flags.as_ref()
    }

    /// Signed distance of a deformable node on the previous frame.
    #[must_use]
    pub fn node_distance(&self, index: usize) -> Option<f64> {
        self.node_distances.get(index).copied().flatten()
    }

    /// Advances the clock and returns the time since the previous call.
    ///
    /// Returns zero on the first call or if time did not move forward.
    pub(crate) fn advance_clock(&mut self, timestamp: f64) -> f64 {
        let dt = match self.last_update {
            Some(prev) if timestamp.is_finite() && timestamp > prev => timestamp - prev,
            _ => 0.0,
        };
        self.prev_dt = self.dt;
        self.dt = dt;
        if timestamp.is_finite() {
            self.last_update = Some(timestamp);
        }
        dt
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let mut state = ContactState::new();
        assert_eq!(state.advance_clock(1.0), 0.0);
        assert!((state.advance_clock(1.25) - 0.25).abs() < 1e-12);
        assert!((state.advance_clock(1.5) - 0.25).abs() < 1e-12);
        assert!((state.previous_dt() - 0.25).abs() < 1e-12);
        assert_eq!(state.last_update(), Some(1.5));
    }

    #[test]
    fn test_clock_ignores_backwards_time() {
        let mut state = ContactState::new();
        state.advance_clock(2.0);
        assert_eq!(state.advance_clock(1.0), 0.0);
        assert_eq!(state.advance_clock(f64::NAN), 0.0);
        assert_eq!(state.last_update(), Some(1.0));
    }

    #[test]
    fn test_reset() {
        let mut state = ContactState::new();
        state.advance_clock(3.0);
        state.held_frames = 2;
        state.node_distances = vec![Some(0.1)];
        state.reset();
        assert_eq!(state, ContactState::default());
        assert!(state.node_distance(0).is_none());
    }
}
