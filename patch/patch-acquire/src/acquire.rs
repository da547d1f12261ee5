//! Candidate gathering from manifolds and deformable nodes.

use nalgebra::{Point3, Vector3};
use patch_types::Plane;
use tracing::trace;

use crate::params::ContactParams;
use crate::result::AcquisitionDiagnostics;
use crate::source::{BodyType, DeformableNodes, ManifoldSource};
use crate::state::ContactState;

/// A raw contact before noise control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) position: Point3<f64>,
    pub(crate) normal: Vector3<f64>,
}

fn is_finite_point(p: &Point3<f64>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

/// Collects this frame's raw candidates.
///
/// Node scanning needs a plane; without one, soft bodies fall back to their
/// manifold contacts.
pub(crate) fn gather_candidates(
    params: &ContactParams,
    body_type: BodyType,
    manifolds: &dyn ManifoldSource,
    nodes: Option<&dyn DeformableNodes>,
    plane: Option<&Plane>,
    state: &mut ContactState,
    diagnostics: &mut AcquisitionDiagnostics,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    scan_manifolds(params, manifolds, &mut out, diagnostics);

    if body_type == BodyType::Soft {
        if let (Some(nodes), Some(plane)) = (nodes, plane) {
            scan_nodes(params, nodes, plane, state, &mut out, diagnostics);
        }
    }

    trace!(
        manifold = diagnostics.manifold_candidates,
        node = diagnostics.node_candidates,
        "Gathered contact candidates"
    );
    out
}

fn push_capped(
    params: &ContactParams,
    candidate: Candidate,
    out: &mut Vec<Candidate>,
    diagnostics: &mut AcquisitionDiagnostics,
) -> bool {
    if out.len() >= params.max_candidates {
        diagnostics.removed_by_cap += 1;
        return false;
    }
    out.push(candidate);
    true
}

fn scan_manifolds(
    params: &ContactParams,
    manifolds: &dyn ManifoldSource,
    out: &mut Vec<Candidate>,
    diagnostics: &mut AcquisitionDiagnostics,
) {
    let count = manifolds.manifold_count().min(params.max_manifolds);
    for m in 0..count {
        if !manifolds.involves_body(m) {
            continue;
        }
        for i in 0..manifolds.contact_count(m) {
            let Some(contact) = manifolds.contact(m, i) else {
                continue;
            };
            if !is_finite_point(&contact.position) {
                continue;
            }
            if params.use_distance_filter && contact.separation > params.max_separation {
                diagnostics.removed_by_distance += 1;
                continue;
            }
            let candidate = Candidate {
                position: contact.position,
                normal: contact.normal,
            };
            if push_capped(params, candidate, out, diagnostics) {
                diagnostics.manifold_candidates += 1;
            }
        }
    }
}

/// Admits nodes by distance, entering transition or approach speed.
///
/// Every node's signed distance is remembered for the next frame, whether or
/// not it was admitted.
fn scan_nodes(
    params: &ContactParams,
    nodes: &dyn DeformableNodes,
    plane: &Plane,
    state: &mut ContactState,
    out: &mut Vec<Candidate>,
    diagnostics: &mut AcquisitionDiagnostics,
) {
    let count = nodes.node_count();
    state.node_distances.resize(count, None);
    let normal = plane.normal();

    for (i, memory) in state.node_distances.iter_mut().enumerate() {
        let previous = memory.take();
        let Some(node) = nodes.node(i) else {
            continue;
        };
        if !is_finite_point(&node.position) {
            continue;
        }
        let distance = plane.signed_distance(&node.position);
        *memory = Some(distance);

        let direct = distance <= params.enter_distance;
        let entering = params.use_hysteresis
            && previous.is_some_and(|d| d > params.exit_distance)
            && distance <= params.enter_distance;
        let approaching =
            params.use_velocity_gate && node.velocity.dot(&normal) < -params.min_approach_speed;

        if entering {
            diagnostics.hysteresis_entries += 1;
        }
        if !(direct || entering || approaching) {
            continue;
        }

        let candidate = Candidate {
            position: node.position,
            normal: node.normal,
        };
        if push_capped(params, candidate, out, diagnostics) {
            diagnostics.node_candidates += 1;
            if !direct && !entering {
                diagnostics.velocity_gated += 1;
            }
        }
    }
}
