//! Read-only views of the physics collaborator.
//!
//! The pipeline never talks to a physics engine directly. An adapter
//! implements these traits over the engine's own storage, or the caller fills
//! the plain-data types ([`ManifoldSet`], [`NodeSet`], [`BodyMotion`]) once
//! per frame.

use nalgebra::{Point3, Vector3};
use patch_types::Plane;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the tracked body is rigid or deformable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyType {
    /// Contacts come from collision manifolds only.
    #[default]
    Rigid,
    /// Contacts come from manifolds and from deformable nodes near the ground.
    Soft,
}

/// One contact point reported by the collision engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifoldContact {
    /// World position.
    pub position: Point3<f64>,
    /// World normal.
    pub normal: Vector3<f64>,
    /// Separation distance (positive when apart).
    pub separation: f64,
}

impl ManifoldContact {
    /// Create a contact.
    #[must_use]
    pub const fn new(position: Point3<f64>, normal: Vector3<f64>, separation: f64) -> Self {
        Self {
            position,
            normal,
            separation,
        }
    }
}

/// Access to the collision manifolds of one frame.
pub trait ManifoldSource {
    /// Number of active manifolds.
    fn manifold_count(&self) -> usize;

    /// Number of contacts in a manifold.
    fn contact_count(&self, manifold: usize) -> usize;

    /// A single contact, or `None` if the indices are out of range.
    fn contact(&self, manifold: usize, index: usize) -> Option<ManifoldContact>;

    /// Whether a manifold involves the tracked body.
    fn involves_body(&self, _manifold: usize) -> bool {
        true
    }
}

/// A manifold as plain data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactManifold {
    /// Contacts in this manifold.
    pub contacts: Vec<ManifoldContact>,
    /// Whether the tracked body is one of the two colliders.
    pub involves_body: bool,
}

impl ContactManifold {
    /// Create a manifold involving the tracked body.
    #[must_use]
    pub const fn new(contacts: Vec<ManifoldContact>) -> Self {
        Self {
            contacts,
            involves_body: true,
        }
    }

    /// Create a manifold between two other bodies.
    #[must_use]
    pub const fn unrelated(contacts: Vec<ManifoldContact>) -> Self {
        Self {
            contacts,
            involves_body: false,
        }
    }
}

/// The manifolds of one frame as plain data.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifoldSet {
    manifolds: Vec<ContactManifold>,
}

impl ManifoldSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            manifolds: Vec::new(),
        }
    }

    /// Add a manifold.
    pub fn push(&mut self, manifold: ContactManifold) {
        self.manifolds.push(manifold);
    }

    /// Returns true if there are no manifolds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    /// The manifolds in insertion order.
    #[must_use]
    pub fn manifolds(&self) -> &[ContactManifold] {
        &self.manifolds
    }
}

impl FromIterator<ContactManifold> for ManifoldSet {
    fn from_iter<I: IntoIterator<Item = ContactManifold>>(iter: I) -> Self {
        Self {
            manifolds: iter.into_iter().collect(),
        }
    }
}

impl ManifoldSource for ManifoldSet {
    fn manifold_count(&self) -> usize {
        self.manifolds.len()
    }

    fn contact_count(&self, manifold: usize) -> usize {
        self.manifolds.get(manifold).map_or(0, |m| m.contacts.len())
    }

    fn contact(&self, manifold: usize, index: usize) -> Option<ManifoldContact> {
        self.manifolds.get(manifold)?.contacts.get(index).copied()
    }

    fn involves_body(&self, manifold: usize) -> bool {
        self.manifolds.get(manifold).is_some_and(|m| m.involves_body)
    }
}

/// State of one deformable node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoftNode {
    /// World position.
    pub position: Point3<f64>,
    /// World velocity.
    pub velocity: Vector3<f64>,
    /// Outward surface normal.
    pub normal: Vector3<f64>,
}

impl SoftNode {
    /// Create a node.
    #[must_use]
    pub const fn new(position: Point3<f64>, velocity: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            velocity,
            normal,
        }
    }
}

/// Access to the nodes of a deformable body, in a stable order.
///
/// Node indices must refer to the same node across frames; the pipeline
/// keys its per-node hysteresis memory by index.
pub trait DeformableNodes {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// A single node, or `None` if out of range.
    fn node(&self, index: usize) -> Option<SoftNode>;
}

impl DeformableNodes for [SoftNode] {
    fn node_count(&self) -> usize {
        self.len()
    }

    fn node(&self, index: usize) -> Option<SoftNode> {
        self.get(index).copied()
    }
}

impl DeformableNodes for Vec<SoftNode> {
    fn node_count(&self) -> usize {
        self.len()
    }

    fn node(&self, index: usize) -> Option<SoftNode> {
        self.get(index).copied()
    }
}

/// Deformable nodes as plain data.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeSet {
    nodes: Vec<SoftNode>,
}

impl NodeSet {
    /// Wrap a node list.
    #[must_use]
    pub const fn new(nodes: Vec<SoftNode>) -> Self {
        Self { nodes }
    }

    /// Mutable access for updating nodes in place between frames.
    pub fn nodes_mut(&mut self) -> &mut [SoftNode] {
        &mut self.nodes
    }
}

impl DeformableNodes for NodeSet {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, index: usize) -> Option<SoftNode> {
        self.nodes.get(index).copied()
    }
}

/// Motion of the tracked body.
pub trait BodyKinematics {
    /// World-frame linear velocity (m/s).
    fn linear_velocity(&self) -> Vector3<f64>;

    /// World-frame angular velocity (rad/s).
    fn angular_velocity(&self) -> Vector3<f64>;

    /// Mass in kilograms, if the engine exposes it.
    fn mass(&self) -> Option<f64> {
        None
    }
}

/// Body motion as plain data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyMotion {
    /// Linear velocity (m/s).
    pub linear: Vector3<f64>,
    /// Angular velocity (rad/s).
    pub angular: Vector3<f64>,
    /// Mass (kg), if known.
    pub mass: Option<f64>,
}

impl BodyMotion {
    /// A body at rest.
    #[must_use]
    pub fn at_rest() -> Self {
        Self::default()
    }

    /// A body with the given velocities.
    #[must_use]
    pub const fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self {
            linear,
            angular,
            mass: None,
        }
    }

    /// Set the mass.
    #[must_use]
    pub const fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }
}

impl BodyKinematics for BodyMotion {
    fn linear_velocity(&self) -> Vector3<f64> {
        self.linear
    }

    fn angular_velocity(&self) -> Vector3<f64> {
        self.angular
    }

    fn mass(&self) -> Option<f64> {
        self.mass
    }
}

/// Everything the pipeline reads for one frame.
///
/// # Example
///
/// ```
/// use patch_acquire::{AcquisitionContext, BodyMotion, BodyType, ManifoldSet};
///
/// let manifolds = ManifoldSet::new();
/// let body = BodyMotion::at_rest();
/// let ctx = AcquisitionContext::rigid(0.016, &manifolds, &body);
/// assert_eq!(ctx.body_type, BodyType::Rigid);
/// assert!(ctx.nodes.is_none());
/// ```
#[derive(Clone, Copy)]
pub struct AcquisitionContext<'a> {
    /// Rigid or soft acquisition path.
    pub body_type: BodyType,
    /// Wall-clock time of this frame (s).
    pub timestamp: f64,
    /// Collision manifolds.
    pub manifolds: &'a dyn ManifoldSource,
    /// Deformable nodes, for soft bodies.
    pub nodes: Option<&'a dyn DeformableNodes>,
    /// Body velocities.
    pub body: &'a dyn BodyKinematics,
    /// World-space surface vertices used for synthetic points.
    pub mesh_vertices: Option<&'a [Point3<f64>]>,
    /// Contact plane replacing the configured ground plane.
    pub contact_plane: Option<Plane>,
}

impl<'a> AcquisitionContext<'a> {
    /// Context for a rigid body.
    #[must_use]
    pub fn rigid(
        timestamp: f64,
        manifolds: &'a dyn ManifoldSource,
        body: &'a dyn BodyKinematics,
    ) -> Self {
        Self {
            body_type: BodyType::Rigid,
            timestamp,
            manifolds,
            nodes: None,
            body,
            mesh_vertices: None,
            contact_plane: None,
        }
    }

    /// Context for a deformable body.
    #[must_use]
    pub fn soft(
        timestamp: f64,
        manifolds: &'a dyn ManifoldSource,
        nodes: &'a dyn DeformableNodes,
        body: &'a dyn BodyKinematics,
    ) -> Self {
        Self {
            body_type: BodyType::Soft,
            timestamp,
            manifolds,
            nodes: Some(nodes),
            body,
            mesh_vertices: None,
            contact_plane: None,
        }
    }

    /// Attach surface vertices for synthetic augmentation.
    #[must_use]
    pub const fn with_mesh(mut self, vertices: &'a [Point3<f64>]) -> Self {
        self.mesh_vertices = Some(vertices);
        self
    }

    /// Override the ground plane for this frame.
    #[must_use]
    pub const fn with_plane(mut self, plane: Plane) -> Self {
        self.contact_plane = Some(plane);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_manifold_set_access() {
        let set: ManifoldSet = [
            ContactManifold::new(vec![
                ManifoldContact::new(Point3::origin(), Vector3::y(), 0.0),
                ManifoldContact::new(Point3::new(1.0, 0.0, 0.0), Vector3::y(), 0.001),
            ]),
            ContactManifold::unrelated(vec![]),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.manifold_count(), 2);
        assert_eq!(set.contact_count(0), 2);
        assert_eq!(set.contact_count(5), 0);
        assert!((set.contact(0, 1).unwrap().separation - 0.001).abs() < 1e-12);
        assert!(set.contact(0, 2).is_none());
        assert!(set.involves_body(0));
        assert!(!set.involves_body(1));
    }

    #[test]
    fn test_node_access() {
        let nodes = vec![SoftNode::new(Point3::origin(), Vector3::zeros(), Vector3::y())];
        let set = NodeSet::new(nodes.clone());
        assert_eq!(set.node_count(), 1);
        assert_eq!(nodes.as_slice().node_count(), 1);
        assert!(set.node(1).is_none());
    }

    #[test]
    fn test_body_motion_defaults() {
        let body = BodyMotion::at_rest();
        assert!(body.mass().is_none());
        assert_eq!(body.with_mass(2.0).mass(), Some(2.0));
    }
}
