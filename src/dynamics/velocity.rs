use glam::Vec2;

use crate::{
    core::{layout::StrandLayout, node::HairNode, params::SimulationParams, store::NodeStore},
    gpu::Execution,
};

/// Kernel 1: blends each node's velocity with its chain neighbours'.
///
/// Reads a consistent snapshot of pre-stage velocities into scratch before
/// committing, so the outcome does not depend on worker order.
pub fn run(store: &mut NodeStore, params: &SimulationParams, exec: Execution) {
    let weight = params.velocity_coupling;
    if weight == 0.0 {
        return;
    }

    let layout = *store.layout();
    let nodes = &store.nodes;
    exec.map_into(&mut store.scratch, |i| {
        blended_velocity(nodes, &layout, i, weight)
    });

    let scratch = &store.scratch;
    exec.for_each_mut(&mut store.nodes, |i, node| node.velocity = scratch[i]);
}

/// `(1 - w) * v_i + w * mean(v_neighbours)` over the neighbours that exist in
/// the node's own strand.
pub fn blended_velocity(nodes: &[HairNode], layout: &StrandLayout, index: usize, weight: f32) -> Vec2 {
    let own = nodes[index].velocity;
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for neighbor in [layout.prev(index), layout.next(index)].into_iter().flatten() {
        sum += nodes[neighbor].velocity;
        count += 1;
    }
    if count == 0 {
        return own;
    }
    own * (1.0 - weight) + (sum / count as f32) * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::params::ColliderDesc, dynamics::fixed_point::ForceCodec};

    fn store_with_velocities(strands: usize, velocities: &[Vec2]) -> NodeStore {
        let per_strand = velocities.len() / strands;
        let mut store = NodeStore::new(
            StrandLayout::new(strands, per_strand).unwrap(),
            ForceCodec::default(),
            &[] as &[ColliderDesc],
            0.5,
        )
        .unwrap();
        for (node, &v) in store.nodes.iter_mut().zip(velocities) {
            node.velocity = v;
        }
        store
    }

    #[test]
    fn interior_node_averages_both_neighbours() {
        let mut store = store_with_velocities(
            1,
            &[Vec2::new(2.0, 0.0), Vec2::ZERO, Vec2::new(0.0, 4.0)],
        );
        let params = SimulationParams {
            velocity_coupling: 0.5,
            ..SimulationParams::default()
        };
        run(&mut store, &params, Execution::Sequential);
        assert_eq!(store.nodes[1].velocity, Vec2::new(0.5, 1.0));
        // End nodes only see their single neighbour.
        assert_eq!(store.nodes[0].velocity, Vec2::new(1.0, 0.0));
        assert_eq!(store.nodes[2].velocity, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn boundary_nodes_ignore_adjacent_strand() {
        // Two strands of two nodes: index 1 ends strand 0, index 2 starts strand 1.
        let mut store = store_with_velocities(
            2,
            &[Vec2::ZERO, Vec2::ZERO, Vec2::new(8.0, 8.0), Vec2::new(8.0, 8.0)],
        );
        let params = SimulationParams {
            velocity_coupling: 1.0,
            ..SimulationParams::default()
        };
        run(&mut store, &params, Execution::Sequential);
        assert_eq!(store.nodes[1].velocity, Vec2::ZERO);
        assert_eq!(store.nodes[2].velocity, Vec2::new(8.0, 8.0));
    }
}
