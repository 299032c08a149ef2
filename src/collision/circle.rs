use glam::Vec2;

use crate::{
    config::EPSILON,
    core::{
        node::{ColliderNode, HairNode},
        params::SimulationParams,
        store::NodeStore,
    },
    dynamics::fixed_point::ForceCodec,
    gpu::Execution,
};

/// Kernel 3: resolves penetration between every node and every collider.
///
/// Full pairwise scan, `O(nodes × colliders)`. Each worker writes its own node
/// and adds the contact reaction into the shared collider accumulators.
///
/// Colliders are resolved in index order, one pass per node. Where colliders
/// overlap, the push out of a later collider can leave the node inside an
/// earlier one until the next sub-step.
pub fn run(store: &mut NodeStore, params: &SimulationParams, exec: Execution) {
    if store.colliders.is_empty() {
        return;
    }

    let codec = *store.codec();
    let impulse_gain = impulse_gain(params.d_velocity);
    let colliders = &store.colliders;
    exec.for_each_mut(&mut store.nodes, |_, node| {
        for collider in colliders {
            resolve_contact(node, collider, &codec, impulse_gain);
        }
    });
}

/// Scales a velocity change into the force units the integrator expects.
fn impulse_gain(d_velocity: f32) -> f32 {
    if d_velocity.abs() > EPSILON {
        1.0 / d_velocity
    } else {
        1.0
    }
}

/// Projects `node` onto the surface of `collider` if it lies inside.
///
/// The impulse cancels the node's inbound speed and adds an outward kick equal
/// to the penetration depth. The collider receives the opposite impulse.
/// Returns the impulse applied to the node, if any.
pub fn resolve_contact(
    node: &mut HairNode,
    collider: &ColliderNode,
    codec: &ForceCodec,
    impulse_gain: f32,
) -> Option<Vec2> {
    let delta = node.position - collider.position;
    let distance_sq = delta.length_squared();
    if distance_sq >= collider.radius * collider.radius {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > EPSILON {
        delta / distance
    } else {
        Vec2::Y
    };
    let depth = collider.radius - distance;

    node.position = collider.position + normal * collider.radius;

    let inbound = (-node.velocity.dot(normal)).max(0.0);
    let impulse = normal * ((inbound + depth) * impulse_gain);
    node.force.add(codec, impulse);
    collider.force.add(codec, -impulse);
    Some(impulse)
}
