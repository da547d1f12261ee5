//! Contact planes and their local tangent frames.

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::error::GeometryError;

/// Vectors shorter than this are treated as zero before normalization.
pub const NORMALIZE_EPSILON: f64 = 1e-9;

/// Normalizes `v`, returning `fallback` when `v` is near zero or not finite.
///
/// # Example
///
/// ```
/// use patch_types::safe_normalize;
/// use nalgebra::Vector3;
///
/// let n = safe_normalize(Vector3::new(0.0, 3.0, 0.0), Vector3::x());
/// assert!((n.y - 1.0).abs() < 1e-12);
///
/// let fallback = safe_normalize(Vector3::zeros(), Vector3::y());
/// assert_eq!(fallback, Vector3::y());
/// ```
#[must_use]
pub fn safe_normalize(v: Vector3<f64>, fallback: Vector3<f64>) -> Vector3<f64> {
    let len = v.norm();
    if len.is_finite() && len > NORMALIZE_EPSILON {
        v / len
    } else {
        fallback
    }
}

/// An infinite plane given by a unit normal and an anchor point.
///
/// The plane also carries an orthonormal tangent frame used to express
/// points as 2D coordinates. For the default ground plane (normal `+Y`) the
/// frame is tangent `+X`, bitangent `+Z`, so local coordinates equal world
/// `(x, z)` up to the anchor offset.
///
/// # Example
///
/// ```
/// use patch_types::Plane;
/// use nalgebra::Point3;
///
/// let ground = Plane::ground(0.0);
/// assert!((ground.signed_distance(&Point3::new(1.0, 0.25, 2.0)) - 0.25).abs() < 1e-12);
///
/// let local = ground.to_local(&Point3::new(1.0, 0.25, 2.0));
/// assert!((local.x - 1.0).abs() < 1e-12);
/// assert!((local.y - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    normal: Vector3<f64>,
    anchor: Point3<f64>,
    offset: f64,
    tangent: Vector3<f64>,
    bitangent: Vector3<f64>,
}

impl Plane {
    /// Creates a plane through `anchor` with the given normal.
    ///
    /// The normal is normalized. Returns `None` if it is near zero or if any
    /// input is not finite.
    #[must_use]
    pub fn new(normal: Vector3<f64>, anchor: Point3<f64>) -> Option<Self> {
        Self::try_new(normal, anchor).ok()
    }

    /// Creates a plane, reporting why construction failed.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for NaN/infinite input and
    /// [`GeometryError::DegenerateNormal`] for a near-zero normal.
    pub fn try_new(normal: Vector3<f64>, anchor: Point3<f64>) -> Result<Self, GeometryError> {
        if !anchor.coords.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite("anchor"));
        }
        if !normal.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite("normal"));
        }
        let len = normal.norm();
        if len <= NORMALIZE_EPSILON {
            return Err(GeometryError::DegenerateNormal);
        }
        let normal = normal / len;
        let (tangent, bitangent) = tangent_frame(&normal);
        Ok(Self {
            normal,
            anchor,
            offset: anchor.coords.dot(&normal),
            tangent,
            bitangent,
        })
    }

    /// Creates the plane `{ p : p · n = offset }`.
    ///
    /// The anchor is the point of the plane closest to the origin.
    #[must_use]
    pub fn from_normal_offset(normal: Vector3<f64>, offset: f64) -> Option<Self> {
        let len = normal.norm();
        if !len.is_finite() || len <= NORMALIZE_EPSILON || !offset.is_finite() {
            return None;
        }
        let unit = normal / len;
        Self::new(unit, Point3::from(unit * offset))
    }

    /// Horizontal ground plane `y = height` with normal `+Y`.
    #[must_use]
    pub fn ground(height: f64) -> Self {
        let normal = Vector3::y();
        let (tangent, bitangent) = tangent_frame(&normal);
        Self {
            normal,
            anchor: Point3::new(0.0, height, 0.0),
            offset: height,
            tangent,
            bitangent,
        }
    }

    /// Unit normal.
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Anchor point the plane was built from.
    #[must_use]
    pub const fn anchor(&self) -> Point3<f64> {
        self.anchor
    }

    /// Scalar offset `anchor · normal`.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    /// Orthonormal in-plane axes `(tangent, bitangent)`.
    #[must_use]
    pub const fn tangent_frame(&self) -> (Vector3<f64>, Vector3<f64>) {
        (self.tangent, self.bitangent)
    }

    /// Signed distance from `point`, positive on the side the normal points to.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        point.coords.dot(&self.normal) - self.offset
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Expresses `point` in the plane's local 2D frame (relative to the anchor).
    ///
    /// The out-of-plane component is discarded.
    #[must_use]
    pub fn to_local(&self, point: &Point3<f64>) -> Point2<f64> {
        let d = point - self.anchor;
        Point2::new(d.dot(&self.tangent), d.dot(&self.bitangent))
    }

    /// Maps local 2D coordinates back onto the plane in world space.
    #[must_use]
    pub fn from_local(&self, local: &Point2<f64>) -> Point3<f64> {
        self.anchor + self.tangent * local.x + self.bitangent * local.y
    }

    /// Expresses a world vector in the local frame, dropping its normal component.
    #[must_use]
    pub fn to_local_vector(&self, v: &Vector3<f64>) -> Vector2<f64> {
        Vector2::new(v.dot(&self.tangent), v.dot(&self.bitangent))
    }

    /// Returns the same plane re-anchored at `point` projected onto it.
    #[must_use]
    pub fn reanchored(&self, point: &Point3<f64>) -> Self {
        Self {
            anchor: self.project(point),
            ..*self
        }
    }
}

/// Gram-Schmidt tangent frame for a unit normal.
///
/// The reference axis is world X unless the normal is nearly parallel to it,
/// in which case world Z is used. The bitangent is `tangent × normal`.
fn tangent_frame(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::z()
    };
    let tangent = safe_normalize(reference - normal * reference.dot(normal), Vector3::x());
    let bitangent = safe_normalize(tangent.cross(normal), Vector3::z());
    (tangent, bitangent)
}
