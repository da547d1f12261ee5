//! Centroid and normal estimation.

// Point counts stay far below 2^52.
#![allow(clippy::cast_precision_loss)]

use nalgebra::{Point3, Vector3};
use patch_types::safe_normalize;

use crate::acquire::Candidate;

/// Mean position and hemisphere-aligned mean normal of the raw candidates.
///
/// Each normal is flipped onto the side of `reference` before averaging. A
/// near-zero mean falls back to `reference`.
pub(crate) fn average_raw(
    candidates: &[Candidate],
    reference: &Vector3<f64>,
) -> (Option<Point3<f64>>, Vector3<f64>) {
    if candidates.is_empty() {
        return (None, *reference);
    }
    let mut position = Vector3::zeros();
    let mut normal = Vector3::zeros();
    for c in candidates {
        position += c.position.coords;
        if c.normal.dot(reference) < 0.0 {
            normal -= c.normal;
        } else {
            normal += c.normal;
        }
    }
    let n = candidates.len() as f64;
    (
        Some(Point3::from(position / n)),
        safe_normalize(normal, *reference),
    )
}

/// Arithmetic mean of a point set.
pub(crate) fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

/// Blends `current` toward `previous` with weight `α = exp(-dt / τ)`.
///
/// Returns the blended point and `α`, or `current` unchanged with `None`
/// when `dt` or `tau` is not positive.
pub(crate) fn smooth(
    current: Point3<f64>,
    previous: Point3<f64>,
    dt: f64,
    tau: f64,
) -> (Point3<f64>, Option<f64>) {
    if !(dt > 0.0 && tau > 0.0) {
        return (current, None);
    }
    let alpha = (-dt / tau).exp();
    let blended = previous.coords * alpha + current.coords * (1.0 - alpha);
    (Point3::from(blended), Some(alpha))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candidate(x: f64, normal: Vector3<f64>) -> Candidate {
        Candidate {
            position: Point3::new(x, 0.0, 0.0),
            normal,
        }
    }

    #[test]
    fn test_average_flips_normals() {
        let cands = [candidate(0.0, Vector3::y()), candidate(2.0, -Vector3::y())];
        let (point, normal) = average_raw(&cands, &Vector3::y());
        assert_relative_eq!(point.unwrap().x, 1.0);
        assert_relative_eq!(normal, Vector3::y());
    }

    #[test]
    fn test_average_degenerate_normal_falls_back() {
        let cands = [candidate(0.0, Vector3::zeros())];
        let (_, normal) = average_raw(&cands, &Vector3::y());
        assert_eq!(normal, Vector3::y());

        let (point, normal) = average_raw(&[], &Vector3::y());
        assert!(point.is_none());
        assert_eq!(normal, Vector3::y());
    }

    #[test]
    fn test_centroid() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 4.0)];
        assert_relative_eq!(centroid(&pts).unwrap(), Point3::new(1.0, 0.0, 2.0));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_smooth_is_frame_rate_independent() {
        let prev = Point3::origin();
        let target = Point3::new(1.0, 0.0, 0.0);
        let tau = 0.05;

        // One 20 ms step
        let (one, _) = smooth(target, prev, 0.02, tau);
        // Two 10 ms steps toward the same target
        let (half, _) = smooth(target, prev, 0.01, tau);
        let (two, _) = smooth(target, half, 0.01, tau);

        assert_relative_eq!(one, two, epsilon = 1e-12);
    }

    #[test]
    fn test_smooth_skips_invalid_dt() {
        let (p, alpha) = smooth(Point3::new(1.0, 0.0, 0.0), Point3::origin(), 0.0, 0.05);
        assert!(alpha.is_none());
        assert_relative_eq!(p.x, 1.0);
        let (_, alpha) = smooth(Point3::origin(), Point3::origin(), 0.01, 0.0);
        assert!(alpha.is_none());
    }
}
