//! Oriented bounding rectangle algorithms.
//!
//! Every fitter works on points already expressed in a plane's local 2D
//! frame and returns a [`BoundingBox2D`] in that same frame:
//!
//! - [`fit_aabb`] - axis-aligned bounds (θ = 0)
//! - [`fit_pca`] - orientation from the dominant covariance eigenvector
//! - [`fit_ombb`] - minimum-area rectangle via convex hull + rotating calipers
//! - [`fit_kdop`] - best of `k` evenly spaced orientations in `[0, π)`
//! - [`fit_hybrid`] - k-DOP followed by a local angular refinement
//!
//! All of them return `None` only for an empty point set and raise width and
//! height to `min_size`.

// Orientation counts are tiny; casting them to f64 is exact.
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;

use nalgebra::{Matrix2, Point2, Vector2};
use patch_types::BoundingBox2D;

use crate::hull::convex_hull;

/// Off-diagonal covariance below this is treated as an already diagonal matrix.
const PCA_DIAGONAL_EPSILON: f64 = 1e-12;

/// Relative area improvement required to replace the current best candidate.
const AREA_TIE_EPSILON: f64 = 1e-12;

/// Samples per refinement pass in [`fit_hybrid`].
const REFINE_SAMPLES: usize = 10;

/// Number of window-shrinking passes in [`fit_hybrid`].
const REFINE_PASSES: usize = 4;

/// Bounds `points` with a rectangle at fixed orientation `theta`.
///
/// Points are projected onto the axes `(cos θ, sin θ)` and `(-sin θ, cos θ)`;
/// the rectangle spans the projected extents. This is the common final step of
/// every fitter and the re-projection used by the orientation stabilizer.
///
/// # Example
///
/// ```
/// use patch_fit::project_at;
/// use nalgebra::Point2;
/// use std::f64::consts::FRAC_PI_4;
///
/// let diamond = [
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
///     Point2::new(-1.0, 0.0),
///     Point2::new(0.0, -1.0),
/// ];
/// let b = project_at(&diamond, FRAC_PI_4, 0.0).unwrap();
/// assert!((b.width - 2.0_f64.sqrt()).abs() < 1e-12);
/// assert!((b.height - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
#[must_use]
pub fn project_at(points: &[Point2<f64>], theta: f64, min_size: f64) -> Option<BoundingBox2D> {
    let (min_u, max_u, min_v, max_v) = projected_extents(points, theta)?;
    let (s, c) = theta.sin_cos();
    let cu = 0.5 * (min_u + max_u);
    let cv = 0.5 * (min_v + max_v);
    let center = Point2::new(cu * c - cv * s, cu * s + cv * c);
    Some(BoundingBox2D::new(max_u - min_u, max_v - min_v, center, theta).with_min_size(min_size))
}

/// Area of the rectangle `project_at` would return, without the size floor.
fn projected_area(points: &[Point2<f64>], theta: f64) -> f64 {
    projected_extents(points, theta).map_or(f64::INFINITY, |(min_u, max_u, min_v, max_v)| {
        (max_u - min_u) * (max_v - min_v)
    })
}

fn projected_extents(points: &[Point2<f64>], theta: f64) -> Option<(f64, f64, f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let (s, c) = theta.sin_cos();
    let mut min_u = f64::INFINITY;
    let mut max_u = f64::NEG_INFINITY;
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for p in points {
        let u = p.x * c + p.y * s;
        let v = -p.x * s + p.y * c;
        min_u = min_u.min(u);
        max_u = max_u.max(u);
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    Some((min_u, max_u, min_v, max_v))
}

/// Picks the minimum-area orientation among `candidates`.
///
/// Earlier candidates win ties.
fn best_orientation(points: &[Point2<f64>], candidates: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for theta in candidates {
        let area = projected_area(points, theta);
        match best {
            Some((_, best_area)) if area >= best_area - AREA_TIE_EPSILON * best_area.abs() => {}
            _ => best = Some((theta, area)),
        }
    }
    best.map(|(theta, _)| theta)
}

/// Axis-aligned bounding rectangle (θ = 0).
#[must_use]
pub fn fit_aabb(points: &[Point2<f64>], min_size: f64) -> Option<BoundingBox2D> {
    project_at(points, 0.0, min_size)
}

/// PCA-oriented bounding rectangle.
///
/// The orientation is the dominant eigenvector of the 2×2 covariance matrix,
/// from the closed form `λ₁ = tr/2 + sqrt(tr²/4 - det)`. Fewer than two
/// points fall back to [`fit_aabb`].
///
/// # Example
///
/// ```
/// use patch_fit::fit_pca;
/// use nalgebra::Point2;
///
/// // Points along the diagonal y = x
/// let pts: Vec<_> = (0..10).map(|i| Point2::new(f64::from(i), f64::from(i) + 0.1 * f64::from(i % 2))).collect();
/// let b = fit_pca(&pts, 0.0).unwrap();
/// assert!((b.theta.abs() - std::f64::consts::FRAC_PI_4).abs() < 0.05);
/// ```
#[must_use]
pub fn fit_pca(points: &[Point2<f64>], min_size: f64) -> Option<BoundingBox2D> {
    if points.len() < 2 {
        return fit_aabb(points, min_size);
    }
    let theta = principal_angle(points);
    project_at(points, theta, min_size)
}

fn principal_angle(points: &[Point2<f64>]) -> f64 {
    let n = points.len() as f64;
    let mean = points.iter().map(|p| p.coords).sum::<Vector2<f64>>() / n;

    let mut cov = Matrix2::zeros();
    for p in points {
        let d = p.coords - mean;
        cov[(0, 0)] += d.x * d.x;
        cov[(0, 1)] += d.x * d.y;
        cov[(1, 1)] += d.y * d.y;
    }
    cov /= n;
    cov[(1, 0)] = cov[(0, 1)];

    let (cxx, cxy, cyy) = (cov[(0, 0)], cov[(0, 1)], cov[(1, 1)]);
    if cxy.abs() < PCA_DIAGONAL_EPSILON {
        return if cxx >= cyy { 0.0 } else { PI / 2.0 };
    }

    let trace = cov.trace();
    let det = cov.determinant();
    let lambda1 = trace / 2.0 + (trace * trace / 4.0 - det).max(0.0).sqrt();
    // (λ₁ - cyy, cxy) is the eigenvector of λ₁
    cxy.atan2(lambda1 - cyy)
}

/// Minimum-area bounding rectangle by rotating calipers.
///
/// Builds the convex hull, then tries the direction of every hull edge as
/// the box orientation, keeping the smallest area. Fewer than three input
/// points, or a hull collapsing below two points, fall back to [`fit_aabb`].
///
/// # Example
///
/// ```
/// use patch_fit::{fit_aabb, fit_ombb};
/// use nalgebra::Point2;
///
/// // Unit square rotated by 30 degrees
/// let (s, c) = 30f64.to_radians().sin_cos();
/// let square: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
///     .iter()
///     .map(|&(x, y)| Point2::new(x * c - y * s, x * s + y * c))
///     .collect();
///
/// let ombb = fit_ombb(&square, 0.0).unwrap();
/// assert!((ombb.area() - 1.0).abs() < 1e-9);
/// assert!(ombb.area() <= fit_aabb(&square, 0.0).unwrap().area());
/// ```
#[must_use]
pub fn fit_ombb(points: &[Point2<f64>], min_size: f64) -> Option<BoundingBox2D> {
    if points.len() < 3 {
        return fit_aabb(points, min_size);
    }
    let hull = convex_hull(points);
    if hull.len() < 2 {
        return fit_aabb(points, min_size);
    }

    let n = hull.len();
    let edges = (0..n).filter_map(|i| {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        let d = b - a;
        (d.norm_squared() > 0.0).then(|| d.y.atan2(d.x))
    });
    let theta = best_orientation(&hull, edges).unwrap_or(0.0);
    project_at(points, theta, min_size)
}

/// Best of `k` evenly spaced orientations `i·π/k`, `i = 0..k`.
///
/// `k = 0` behaves like [`fit_aabb`].
///
/// # Example
///
/// ```
/// use patch_fit::fit_kdop;
/// use nalgebra::Point2;
///
/// let pts = [
///     Point2::new(0.0, 0.0),
///     Point2::new(2.0, 0.0),
///     Point2::new(2.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let b = fit_kdop(&pts, 8, 0.0).unwrap();
/// assert!((b.area() - 2.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn fit_kdop(points: &[Point2<f64>], k: usize, min_size: f64) -> Option<BoundingBox2D> {
    if points.is_empty() {
        return None;
    }
    let theta = kdop_angle(points, k);
    project_at(points, theta, min_size)
}

fn kdop_angle(points: &[Point2<f64>], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let step = PI / k as f64;
    best_orientation(points, (0..k).map(|i| i as f64 * step)).unwrap_or(0.0)
}

/// k-DOP with a local refinement around the best orientation.
///
/// After picking the best of `k` orientations, the window
/// `[θ - tolerance, θ + tolerance]` is sampled and shrunk around the best
/// sample a few times. The result is never larger than the plain k-DOP box.
///
/// # Example
///
/// ```
/// use patch_fit::{fit_hybrid, fit_kdop};
/// use nalgebra::Point2;
///
/// let (s, c) = 0.03f64.sin_cos();
/// let pts: Vec<_> = [(0.0, 0.0), (3.0, 0.0), (3.0, 1.0), (0.0, 1.0)]
///     .iter()
///     .map(|&(x, y)| Point2::new(x * c - y * s, x * s + y * c))
///     .collect();
///
/// let hybrid = fit_hybrid(&pts, 16, 0.05, 0.0).unwrap();
/// let kdop = fit_kdop(&pts, 16, 0.0).unwrap();
/// assert!(hybrid.area() <= kdop.area() + 1e-12);
/// assert!((hybrid.area() - 3.0).abs() < 1e-2);
/// ```
#[must_use]
pub fn fit_hybrid(
    points: &[Point2<f64>],
    k: usize,
    tolerance: f64,
    min_size: f64,
) -> Option<BoundingBox2D> {
    if points.is_empty() {
        return None;
    }
    let mut best = kdop_angle(points, k);
    let mut half_window = if tolerance.is_finite() { tolerance.abs() } else { 0.0 };

    for _ in 0..REFINE_PASSES {
        if half_window <= 0.0 {
            break;
        }
        let step = 2.0 * half_window / REFINE_SAMPLES as f64;
        let start = best - half_window;
        // Current best goes first so it wins ties
        let candidates =
            std::iter::once(best).chain((0..=REFINE_SAMPLES).map(|i| start + i as f64 * step));
        best = best_orientation(points, candidates).unwrap_or(best);
        half_window = step;
    }
    project_at(points, best, min_size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use patch_types::axis_angle_distance;
    use std::f64::consts::FRAC_PI_2;

    fn rotated_rect(w: f64, h: f64, theta: f64, offset: (f64, f64)) -> Vec<Point2<f64>> {
        let (s, c) = theta.sin_cos();
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
            .iter()
            .map(|&(x, y)| Point2::new(x * c - y * s + offset.0, x * s + y * c + offset.1))
            .collect()
    }

    #[test]
    fn test_empty_yields_none() {
        assert!(fit_aabb(&[], 0.0).is_none());
        assert!(fit_pca(&[], 0.0).is_none());
        assert!(fit_ombb(&[], 0.0).is_none());
        assert!(fit_kdop(&[], 8, 0.0).is_none());
        assert!(fit_hybrid(&[], 16, 0.05, 0.0).is_none());
        assert!(project_at(&[], 0.3, 0.0).is_none());
    }

    #[test]
    fn test_aabb_extents() {
        let pts = [Point2::new(-1.0, 2.0), Point2::new(3.0, 5.0), Point2::new(0.0, 4.0)];
        let b = fit_aabb(&pts, 0.0).unwrap();
        assert_relative_eq!(b.width, 4.0);
        assert_relative_eq!(b.height, 3.0);
        assert_relative_eq!(b.center, Point2::new(1.0, 3.5));
        assert_relative_eq!(b.theta, 0.0);
    }

    #[test]
    fn test_single_point_uses_min_size() {
        let b = fit_ombb(&[Point2::new(1.0, 1.0)], 0.01).unwrap();
        assert_relative_eq!(b.width, 0.01);
        assert_relative_eq!(b.height, 0.01);
        assert_relative_eq!(b.center, Point2::new(1.0, 1.0));
    }

    #[test]
    fn test_project_at_center_in_input_frame() {
        let pts = rotated_rect(2.0, 1.0, 0.4, (5.0, -3.0));
        let b = project_at(&pts, 0.4, 0.0).unwrap();
        assert_relative_eq!(b.width, 2.0, epsilon = 1e-12);
        assert_relative_eq!(b.height, 1.0, epsilon = 1e-12);
        for p in &pts {
            assert!(b.contains(p));
        }
        let expected_center = pts.iter().map(|p| p.coords).sum::<Vector2<f64>>() / 4.0;
        assert_relative_eq!(b.center.coords, expected_center, epsilon = 1e-12);
    }

    #[test]
    fn test_pca_diagonal_cases() {
        let horizontal = [Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)];
        assert_relative_eq!(fit_pca(&horizontal, 0.0).unwrap().theta, 0.0);
        let vertical = [Point2::new(0.0, 0.0), Point2::new(0.0, 4.0)];
        let b = fit_pca(&vertical, 0.0).unwrap();
        assert_relative_eq!(b.theta, FRAC_PI_2);
        assert_relative_eq!(b.width, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pca_elongated_rotated_rect() {
        let theta: f64 = 0.6;
        let (s, c) = theta.sin_cos();
        let pts: Vec<_> = (0..50)
            .flat_map(|i| {
                let x = f64::from(i) * 0.1;
                [(x, 0.0), (x, 0.3)]
            })
            .map(|(x, y)| Point2::new(x * c - y * s, x * s + y * c))
            .collect();
        let b = fit_pca(&pts, 0.0).unwrap();
        assert!(axis_angle_distance(b.theta, theta) < 1e-6);
        assert_relative_eq!(b.width, 4.9, epsilon = 1e-6);
        assert_relative_eq!(b.height, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_ombb_recovers_rotated_rect() {
        let pts = rotated_rect(3.0, 1.0, 0.5, (2.0, 1.0));
        let b = fit_ombb(&pts, 0.0).unwrap();
        assert_relative_eq!(b.area(), 3.0, epsilon = 1e-9);
        let d = axis_angle_distance(b.theta, 0.5).min(axis_angle_distance(b.theta, 0.5 + FRAC_PI_2));
        assert!(d < 1e-9);
    }

    #[test]
    fn test_ombb_collinear_points() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        let b = fit_ombb(&pts, 0.001).unwrap();
        assert_relative_eq!(b.width.max(b.height), 2.0 * 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(b.width.min(b.height), 0.001);
    }

    #[test]
    fn test_ombb_two_points_falls_back() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let b = fit_ombb(&pts, 0.0).unwrap();
        assert_relative_eq!(b.theta, 0.0);
        assert_relative_eq!(b.area(), 1.0);
    }

    #[test]
    fn test_kdop_zero_is_aabb() {
        let pts = rotated_rect(2.0, 1.0, 0.3, (0.0, 0.0));
        assert_eq!(fit_kdop(&pts, 0, 0.0), fit_aabb(&pts, 0.0));
    }

    #[test]
    fn test_kdop_angles_stay_in_half_turn() {
        let pts = rotated_rect(2.0, 0.5, 2.0, (0.0, 0.0));
        let b = fit_kdop(&pts, 8, 0.0).unwrap();
        assert!(b.theta >= 0.0 && b.theta < PI);
    }

    #[test]
    fn test_hybrid_never_worse_than_kdop() {
        for i in 0..20 {
            let theta = f64::from(i) * 0.157;
            let pts = rotated_rect(2.5, 0.7, theta, (1.0, -1.0));
            let h = fit_hybrid(&pts, 16, 0.05, 0.0).unwrap();
            let k = fit_kdop(&pts, 16, 0.0).unwrap();
            assert!(h.area() <= k.area() + 1e-12);
        }
    }

    #[test]
    fn test_ombb_not_larger_than_others() {
        let pts = [
            Point2::new(0.1, 0.3),
            Point2::new(2.0, 0.9),
            Point2::new(1.4, 2.2),
            Point2::new(-0.5, 1.1),
            Point2::new(0.8, 1.0),
        ];
        let o = fit_ombb(&pts, 0.0).unwrap().area();
        assert!(o <= fit_aabb(&pts, 0.0).unwrap().area() + 1e-12);
        assert!(o <= fit_pca(&pts, 0.0).unwrap().area() + 1e-12);
        assert!(o <= fit_kdop(&pts, 8, 0.0).unwrap().area() + 1e-12);
    }
}
