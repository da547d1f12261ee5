//! Fitted footprint boxes in plane and world space.

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::angle::wrap_angle;
use crate::plane::Plane;

/// An oriented rectangle in a plane's local 2D frame.
///
/// `width` is measured along the box's local x axis (at angle `theta` from the
/// frame's first axis) and `height` along the perpendicular axis.
///
/// # Example
///
/// ```
/// use patch_types::BoundingBox2D;
/// use nalgebra::Point2;
///
/// let b = BoundingBox2D::new(2.0, 1.0, Point2::new(0.0, 0.0), 0.0);
/// assert!((b.area() - 2.0).abs() < 1e-12);
/// assert!(b.contains(&Point2::new(0.9, 0.4)));
/// assert!(!b.contains(&Point2::new(1.1, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox2D {
    /// Extent along the local x axis.
    pub width: f64,
    /// Extent along the local y axis.
    pub height: f64,
    /// Center in the plane's local frame.
    pub center: Point2<f64>,
    /// Orientation in `(-π, π]`.
    pub theta: f64,
}

impl BoundingBox2D {
    /// Creates a box, wrapping `theta` into `(-π, π]`.
    #[must_use]
    pub fn new(width: f64, height: f64, center: Point2<f64>, theta: f64) -> Self {
        Self {
            width,
            height,
            center,
            theta: wrap_angle(theta),
        }
    }

    /// Raises width and height to at least `min_size`.
    #[must_use]
    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.width = self.width.max(min_size);
        self.height = self.height.max(min_size);
        self
    }

    /// Area of the rectangle.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Unit axes `(along width, along height)`.
    #[must_use]
    pub fn axes(&self) -> (Vector2<f64>, Vector2<f64>) {
        let (s, c) = self.theta.sin_cos();
        (Vector2::new(c, s), Vector2::new(-s, c))
    }

    /// The four corners, counter-clockwise starting at `(-w/2, -h/2)` in box space.
    #[must_use]
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let (u, v) = self.axes();
        let hu = u * (self.width * 0.5);
        let hv = v * (self.height * 0.5);
        [
            self.center - hu - hv,
            self.center + hu - hv,
            self.center + hu + hv,
            self.center - hu + hv,
        ]
    }

    /// Checks whether a point lies inside (or on the border of) the box.
    #[must_use]
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        let (u, v) = self.axes();
        let d = point - self.center;
        let eps = 1e-12;
        d.dot(&u).abs() <= self.width * 0.5 + eps && d.dot(&v).abs() <= self.height * 0.5 + eps
    }
}

/// A fitted footprint in world space.
///
/// Built once per frame from a [`BoundingBox2D`] and the contact plane; a new
/// instance replaces the previous one rather than being mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientedBox3D {
    /// World-space center on the contact plane.
    pub center: Point3<f64>,
    /// Unit contact normal.
    pub normal: Vector3<f64>,
    /// Unit in-plane axis along `width`.
    pub e1: Vector3<f64>,
    /// Unit in-plane axis along `height`.
    pub e2: Vector3<f64>,
    /// Extent along `e1`.
    pub width: f64,
    /// Extent along `e2`.
    pub height: f64,
    /// Fixed extent along `normal`.
    pub depth: f64,
    /// Orientation in the plane frame, `(-π, π]`.
    pub theta: f64,
}

impl OrientedBox3D {
    /// Lifts a plane-local box into world space.
    ///
    /// # Example
    ///
    /// ```
    /// use patch_types::{BoundingBox2D, OrientedBox3D, Plane};
    /// use nalgebra::{Point2, Vector3};
    ///
    /// let plane = Plane::ground(0.0);
    /// let b = BoundingBox2D::new(0.2, 0.1, Point2::new(1.0, 2.0), 0.0);
    /// let obb = OrientedBox3D::from_box2d(&b, &plane, 0.01);
    ///
    /// assert!((obb.center.x - 1.0).abs() < 1e-12);
    /// assert!((obb.center.z - 2.0).abs() < 1e-12);
    /// assert!((obb.e1 - Vector3::x()).norm() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_box2d(bbox: &BoundingBox2D, plane: &Plane, depth: f64) -> Self {
        let (t, b) = plane.tangent_frame();
        let (s, c) = bbox.theta.sin_cos();
        Self {
            center: plane.from_local(&bbox.center),
            normal: plane.normal(),
            e1: t * c + b * s,
            e2: b * c - t * s,
            width: bbox.width,
            height: bbox.height,
            depth,
            theta: bbox.theta,
        }
    }

    /// Footprint area (`width × height`).
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The four footprint corners on the contact plane.
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 4] {
        let hu = self.e1 * (self.width * 0.5);
        let hv = self.e2 * (self.height * 0.5);
        [
            self.center - hu - hv,
            self.center + hu - hv,
            self.center + hu + hv,
            self.center - hu + hv,
        ]
    }
}
