//! Planar convex hull (Andrew's monotone chain).

use nalgebra::Point2;

/// Z component of `(a - o) × (b - o)`.
///
/// Positive for a counter-clockwise (left) turn `o → a → b`.
#[must_use]
pub fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Computes the convex hull of a planar point set.
///
/// Points are sorted by x then y; the lower and upper chains pop every
/// non-left turn, so collinear and duplicate points are dropped. The result
/// is counter-clockwise without a repeated closing vertex.
///
/// Degenerate input yields a short hull: one point for coincident input,
/// two points for collinear input, none for empty input.
///
/// # Example
///
/// ```
/// use patch_fit::convex_hull;
/// use nalgebra::Point2;
///
/// let pts = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.5, 0.2), // interior
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// assert_eq!(convex_hull(&pts).len(), 4);
/// ```
#[must_use]
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut sorted: Vec<Point2<f64>> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2<f64>> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2<f64>> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    // Each chain's last point is the other chain's first
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(hull: &[Point2<f64>]) -> f64 {
        let n = hull.len();
        (0..n)
            .map(|i| {
                let a = hull[i];
                let b = hull[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            * 0.5
    }

    #[test]
    fn test_square_with_interior_points() {
        let mut pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        pts.extend((1..10).map(|i| Point2::new(f64::from(i) * 0.2, 1.0)));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!((signed_area(&hull) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_hull_is_counter_clockwise() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(-1.0, 1.5),
        ];
        let hull = convex_hull(&pts);
        assert!(signed_area(&hull) > 0.0);
        let n = hull.len();
        for i in 0..n {
            assert!(cross(&hull[i], &hull[(i + 1) % n], &hull[(i + 2) % n]) > 0.0);
        }
    }

    #[test]
    fn test_collinear_drops_middle() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull, vec![Point2::new(0.0, 0.0), Point2::new(3.0, 3.0)]);
    }

    #[test]
    fn test_duplicates_and_degenerate() {
        assert!(convex_hull(&[]).is_empty());
        let same = [Point2::new(1.0, 1.0); 5];
        assert_eq!(convex_hull(&same).len(), 1);
    }

    #[test]
    fn test_non_finite_points_ignored() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert_eq!(convex_hull(&pts).len(), 3);
    }
}
