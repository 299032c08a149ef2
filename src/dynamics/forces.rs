use glam::Vec2;

use crate::{
    config::EPSILON,
    core::{layout::StrandLayout, node::HairNode, params::SimulationParams, store::NodeStore},
    dynamics::fixed_point::ForceCodec,
    gpu::Execution,
};

/// Kernel 2: accumulates spring, bending and gravity forces.
///
/// Worker `i` owns the spring to `i + 1` and the bend across `(i - 1, i, i + 1)`,
/// writing the reaction into the neighbours' accumulators. Several workers
/// therefore add into the same cell, which is why every write goes through
/// [`AtomicForce::add`](crate::dynamics::fixed_point::AtomicForce::add).
pub fn run(store: &mut NodeStore, params: &SimulationParams, exec: Execution) {
    let layout = *store.layout();
    let codec = *store.codec();
    let nodes = &store.nodes;
    exec.for_each_index(nodes.len(), |i| {
        accumulate(nodes, &layout, &codec, params, i)
    });
}

fn accumulate(
    nodes: &[HairNode],
    layout: &StrandLayout,
    codec: &ForceCodec,
    params: &SimulationParams,
    index: usize,
) {
    let position = nodes[index].position;
    let mut own = Vec2::new(0.0, -params.gravity);

    if let Some(next) = layout.next(index) {
        let spring = spring_force(position, nodes[next].position, params);
        own += spring;
        nodes[next].force.add(codec, -spring);
    }

    if let (Some(prev), Some(next)) = (layout.prev(index), layout.next(index)) {
        let bend = bending_force(nodes[prev].position, position, nodes[next].position, params);
        own += bend;
        let reaction = -bend * 0.5;
        nodes[prev].force.add(codec, reaction);
        nodes[next].force.add(codec, reaction);
    }

    nodes[index].force.add(codec, own);
}

/// Hooke's law force on the node at `from`, pulling it toward `to` when the
/// link is stretched and pushing it away when compressed.
pub fn spring_force(from: Vec2, to: Vec2, params: &SimulationParams) -> Vec2 {
    let delta = to - from;
    let length = delta.length();
    if length <= EPSILON {
        return Vec2::ZERO;
    }
    delta * (params.stiffness * (length - params.rest_distance) / length)
}

/// Straightening force on `center`, proportional to its offset from the
/// midpoint of its skip-one neighbours `prev` and `next`.
pub fn bending_force(prev: Vec2, center: Vec2, next: Vec2, params: &SimulationParams) -> Vec2 {
    ((prev + next) * 0.5 - center) * params.bending_stiffness
}
