//! Angle wrapping helpers.

use std::f64::consts::{PI, TAU};

/// Wraps an angle into `(-π, π]`.
///
/// Non-finite input is returned as `0.0`.
///
/// # Example
///
/// ```
/// use patch_types::wrap_angle;
/// use std::f64::consts::PI;
///
/// assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
/// assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
/// ```
#[must_use]
pub fn wrap_angle(theta: f64) -> f64 {
    if !theta.is_finite() {
        return 0.0;
    }
    let wrapped = (theta + PI).rem_euclid(TAU) - PI;
    // rem_euclid maps +π onto -π; the range is closed at +π
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Shortest signed angular difference `a - b`, in `(-π, π]`.
#[must_use]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_angle(a - b)
}

/// Distance between two orientations of a line (period π), in `[0, π/2]`.
///
/// Box orientations are equivalent under a half turn, so this is the metric
/// used when comparing fitted angles.
#[must_use]
pub fn axis_angle_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(PI);
    d.min(PI - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_wrap_range() {
        for i in -40..=40 {
            let theta = f64::from(i) * 0.37;
            let w = wrap_angle(theta);
            assert!(w > -PI && w <= PI, "{theta} wrapped to {w}");
            assert_relative_eq!(w.sin(), theta.sin(), epsilon = 1e-9);
            assert_relative_eq!(w.cos(), theta.cos(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_wrap_boundaries() {
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(0.0), 0.0);
        assert_relative_eq!(wrap_angle(f64::NAN), 0.0);
    }

    #[test]
    fn test_angle_difference_shortest_path() {
        assert_relative_eq!(angle_difference(0.1, -0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_difference(PI - 0.1, -PI + 0.1), -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_angle_distance() {
        assert_relative_eq!(axis_angle_distance(0.0, PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(axis_angle_distance(0.1, PI - 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(axis_angle_distance(0.0, FRAC_PI_2), FRAC_PI_2, epsilon = 1e-12);
    }
}
