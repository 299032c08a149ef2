use crate::{
    config::EPSILON,
    core::{node::HairNode, params::SimulationParams, store::NodeStore},
    dynamics::fixed_point::ForceCodec,
    gpu::Execution,
};

/// Kernel 4: semi-implicit Euler step followed by the max-travel clamp.
///
/// Must run last in a sub-step so every force contribution has landed.
pub fn run(store: &mut NodeStore, params: &SimulationParams, exec: Execution) {
    let codec = *store.codec();
    exec.for_each_mut(&mut store.nodes, |_, node| {
        integrate_node(node, &codec, params)
    });

    let per_strand = store.layout().nodes_per_strand();
    if per_strand > 1 {
        let max_travel = params.max_travel_distance;
        exec.for_each_chunk_mut(&mut store.nodes, per_strand, |_, strand| {
            clamp_strand(strand, max_travel)
        });
    }
}

/// Applies the accumulated force, then re-arms the accumulator with the
/// carried-over fraction (`force_decay`), which is zero by default.
pub fn integrate_node(node: &mut HairNode, codec: &ForceCodec, params: &SimulationParams) {
    let force = codec.decode_sum_vec(node.force.raw_mut());

    node.velocity += force * params.d_velocity;
    node.velocity *= params.velocity_decay;
    node.position += node.velocity * params.d_position;

    let carried = if params.force_decay == 0.0 {
        [0, 0]
    } else {
        let [x, y] = codec.encode_vec(force * params.force_decay);
        [i64::from(x), i64::from(y)]
    };
    node.force.set_raw(carried);
}

/// Walks the strand from its first node, pulling each node back toward its
/// already-clamped predecessor whenever the link exceeds `max_travel`.
pub fn clamp_strand(strand: &mut [HairNode], max_travel: f32) {
    for j in 1..strand.len() {
        let anchor = strand[j - 1].position;
        let node = &mut strand[j];
        let delta = node.position - anchor;
        let distance = delta.length();
        if distance > max_travel && distance > EPSILON {
            node.position = anchor + delta * (max_travel / distance);
        }
    }
}
